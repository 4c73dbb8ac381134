use serde::{Deserialize, Serialize};

/// Numbering defects found in one ordered list of numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSet {
    /// Numbers in `1..=max` that never appear, ascending
    pub missing: Vec<u64>,
    /// Numbers seen more than once, ascending and deduplicated
    pub duplicates: Vec<u64>,
    /// Adjacent `(prev, curr)` pairs where `curr != prev + 1`, in encounter order
    pub sequence_errors: Vec<(u64, u64)>,
}

impl IssueSet {
    /// True when nothing is missing, repeated or out of order
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty() && self.sequence_errors.is_empty()
    }

    /// Total number of individual findings
    pub fn count(&self) -> usize {
        self.missing.len() + self.duplicates.len() + self.sequence_errors.len()
    }
}
