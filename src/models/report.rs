use super::{IssueSet, OptionFinding};
use crate::report;
use serde::Serialize;

/// Numbering check for one tag
#[derive(Debug, Clone, Serialize)]
pub struct SequenceCheck {
    /// Label used in the report, e.g. "Question"
    pub tag: String,
    /// Trimmed text of every matched element
    pub texts: Vec<String>,
    /// Parsed numbers; `None` where the text had no number prefix
    pub numbers: Vec<Option<u64>>,
    pub issues: IssueSet,
}

impl SequenceCheck {
    /// How many entries carried a number
    pub fn numbered_count(&self) -> usize {
        self.numbers.iter().filter(|n| n.is_some()).count()
    }

    pub fn format(&self) -> String {
        report::build_sequence_report(&self.tag, self.numbered_count(), &self.issues)
    }
}

/// Everything the pipeline found in one document
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Where the document came from, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Question, Explanations and Answer checks, in that order
    pub sequences: Vec<SequenceCheck>,
    /// Only questions with at least one option issue
    pub options: Vec<OptionFinding>,
}

impl ValidationReport {
    /// True when any sequence or option check failed
    pub fn has_issues(&self) -> bool {
        !self.options.is_empty() || self.sequences.iter().any(|s| !s.issues.is_clean())
    }

    /// "Sequence & Numbering" section
    pub fn sequence_report(&self) -> String {
        self.sequences
            .iter()
            .map(SequenceCheck::format)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// "Option Integrity" section
    pub fn option_report(&self) -> String {
        report::format_option_report(&self.options)
    }

    /// Downloadable text report
    pub fn full_report(&self) -> String {
        report::compose_full_report(&self.sequence_report(), &self.option_report())
    }
}
