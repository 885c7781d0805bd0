use std::collections::HashSet;

use serde::Deserialize;

use crate::domain::AggregatedLabelSet;

/// Things that show up in front of a camera but are not everyday trash.
pub const DEFAULT_DENYLIST: [&str; 10] = [
    "person",
    "laptop",
    "refrigerator",
    "tv",
    "cell phone",
    "hair dryer",
    "remote",
    "fire hydrant",
    "wine glass",
    "donut",
];

/// How labels from the primary and secondary detection sources combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Keep every primary label and add labels only the secondary source saw.
    #[default]
    Union,
    /// Keep only primary labels the secondary source confirms.
    Agreement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedLabels {
    pub labels: Vec<String>,
    pub secondary: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct LabelMergePolicy {
    mode: MergeMode,
    denylist: HashSet<String>,
}

impl LabelMergePolicy {
    pub fn new(mode: MergeMode, denylist: impl IntoIterator<Item = String>) -> Self {
        Self {
            mode,
            denylist: denylist.into_iter().map(|l| normalize(&l)).collect(),
        }
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    pub fn is_denied(&self, label: &str) -> bool {
        self.denylist.contains(&normalize(label))
    }

    /// Cross-check the aggregated labels against an optional second source.
    ///
    /// Denied labels are dropped from both lists. In agreement mode an empty
    /// or missing secondary list confirms nothing and the primary labels pass
    /// through unchanged.
    pub fn merge(&self, primary: &AggregatedLabelSet, secondary: Option<&[String]>) -> MergedLabels {
        let primary: Vec<String> = primary
            .iter()
            .filter(|l| !self.is_denied(l))
            .map(str::to_string)
            .collect();

        let secondary: Option<Vec<String>> = secondary.map(|labels| {
            let mut kept: Vec<String> = Vec::new();
            for label in labels {
                let label = label.trim();
                if label.is_empty() || self.is_denied(label) {
                    continue;
                }
                if !kept.iter().any(|k| same_label(k, label)) {
                    kept.push(label.to_string());
                }
            }
            kept
        });

        let labels = match (&secondary, self.mode) {
            (Some(secondary), MergeMode::Union) => {
                let mut merged = primary.clone();
                for label in secondary {
                    if !merged.iter().any(|m| same_label(m, label)) {
                        merged.push(label.clone());
                    }
                }
                merged
            }
            (Some(secondary), MergeMode::Agreement) if !secondary.is_empty() => primary
                .iter()
                .filter(|p| secondary.iter().any(|s| same_label(p, s)))
                .cloned()
                .collect(),
            _ => primary,
        };

        MergedLabels { labels, secondary }
    }
}

impl Default for LabelMergePolicy {
    fn default() -> Self {
        Self::new(
            MergeMode::default(),
            DEFAULT_DENYLIST.iter().map(|l| l.to_string()),
        )
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

fn same_label(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
