use serde::{Deserialize, Serialize};

/// Failure of one item inside a best-effort batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub item: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem<I> {
    pub item: I,
    pub error: String,
}

/// Full outcome of a best-effort batch. Batches return this instead of failing on the
/// first item, so callers always see every success and every failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome<I, T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<FailedItem<I>>,
}

impl<I, T> Default for BatchOutcome<I, T> {
    fn default() -> Self {
        Self { succeeded: Vec::new(), failed: Vec::new() }
    }
}

impl<I, T> BatchOutcome<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_success(&mut self, value: T) {
        self.succeeded.push(value);
    }

    pub fn push_failure(&mut self, item: I, error: impl ToString) {
        self.failed.push(FailedItem { item, error: error.to_string() });
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Flatten failures into display records, labelling each item with `label`.
    pub fn item_errors(&self, label: impl Fn(&I) -> String) -> Vec<ItemError> {
        self.failed
            .iter()
            .map(|f| ItemError { item: label(&f.item), error: f.error.clone() })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_outcome_collects_both_sides() {
        let mut outcome: BatchOutcome<&str, u32> = BatchOutcome::new();
        outcome.push_success(1);
        outcome.push_failure("second", "boom");
        outcome.push_success(3);

        assert_eq!(outcome.total(), 3);
        assert!(!outcome.is_complete_success());
        let errors = outcome.item_errors(|item| format!("item {item}"));
        assert_eq!(errors, vec![ItemError { item: "item second".into(), error: "boom".into() }]);
    }

    #[test]
    fn test_batch_outcome_serializes_camel_case() {
        let mut outcome: BatchOutcome<String, String> = BatchOutcome::new();
        outcome.push_failure("a".to_string(), "bad");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["failed"][0]["item"], "a");
        assert!(json["succeeded"].as_array().unwrap().is_empty());
    }
}
