use serde::Serialize;

/// Session-scoped set of labels in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregatedLabelSet {
    labels: Vec<String>,
}

impl AggregatedLabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label. Returns false if it was already present.
    pub fn insert(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }
}

impl<'a> FromIterator<&'a str> for AggregatedLabelSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_seen_order_and_drops_duplicates() {
        let mut set = AggregatedLabelSet::new();
        assert!(set.insert("bottle"));
        assert!(set.insert("banana"));
        assert!(!set.insert("bottle"));
        assert_eq!(set.as_slice(), &["bottle".to_string(), "banana".to_string()]);
    }

    #[test]
    fn test_clear_empties_the_set() {
        let mut set: AggregatedLabelSet = ["cup", "fork"].into_iter().collect();
        assert_eq!(set.len(), 2);
        set.clear();
        assert!(set.is_empty());
    }
}
