use std::collections::HashSet;

use crate::domain::{AggregatedLabelSet, Detection, SessionId};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Which per-frame detections are allowed into the label set.
#[derive(Debug, Clone)]
pub struct AggregationPolicy {
    pub confidence_threshold: f32,
    /// Labels never aggregated, e.g. classes known to fire on glare.
    pub exclusions: HashSet<String>,
}

impl AggregationPolicy {
    pub fn new(confidence_threshold: f32, exclusions: impl IntoIterator<Item = String>) -> Self {
        Self {
            confidence_threshold: confidence_threshold.clamp(0.0, 1.0),
            exclusions: exclusions.into_iter().collect(),
        }
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.confidence >= self.confidence_threshold
            && !self.exclusions.contains(&detection.label)
    }
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD, ["wine glass".to_string()])
    }
}

/// Accumulates thresholded, deduplicated labels for exactly one session.
///
/// Holds no I/O. Detections tagged with any other session, or arriving after
/// the set was sealed, are ignored.
#[derive(Debug)]
pub struct LabelAggregator {
    policy: AggregationPolicy,
    session: Option<SessionId>,
    open: bool,
    labels: AggregatedLabelSet,
}

impl LabelAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            session: None,
            open: false,
            labels: AggregatedLabelSet::new(),
        }
    }

    /// Empty the set and bind it to a new session.
    pub fn reset(&mut self, session_id: SessionId) {
        self.session = Some(session_id);
        self.open = true;
        self.labels.clear();
    }

    /// Fold one frame's detections in. Returns the updated set, or `None`
    /// when the detections belong to a session that no longer owns the set.
    pub fn ingest(
        &mut self,
        session_id: SessionId,
        detections: &[Detection],
    ) -> Option<&AggregatedLabelSet> {
        if !self.open || self.session != Some(session_id) {
            return None;
        }
        for detection in detections.iter().filter(|d| self.policy.accepts(d)) {
            self.labels.insert(&detection.label);
        }
        Some(&self.labels)
    }

    /// Stop accepting detections and hand back the final set.
    pub fn seal(&mut self) -> AggregatedLabelSet {
        self.open = false;
        self.labels.clone()
    }

    pub fn labels(&self) -> &AggregatedLabelSet {
        &self.labels
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }
}
