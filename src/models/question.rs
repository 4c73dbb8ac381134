use serde::Serialize;
use std::fmt;

/// Labels every question must carry, in report order
pub const EXPECTED_LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Placeholder number for questions whose text has no period
pub const UNKNOWN_NUMBER: &str = "?";

/// A question and the raw option blocks that follow it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRecord {
    /// Text before the first period, or `?`
    pub number: String,
    /// Full trimmed question text
    pub text: String,
    /// Trimmed text of each option block, in document order
    pub option_blocks: Vec<String>,
}

impl QuestionRecord {
    /// Start a record from a question's trimmed text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let number = match text.split_once('.') {
            Some((prefix, _)) => prefix.trim().to_string(),
            None => UNKNOWN_NUMBER.to_string(),
        };
        Self {
            number,
            text,
            option_blocks: Vec::new(),
        }
    }
}

/// One problem with a question's options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionIssue {
    /// Labels outside a–d, sorted and deduplicated
    InvalidLabels { labels: Vec<char> },
    /// Expected labels with no option
    Missing { labels: Vec<char> },
    /// Option whose content is blank
    Empty { label: char },
    /// Two labels sharing the same content
    DuplicateContent {
        first: char,
        second: char,
        content: String,
    },
}

impl fmt::Display for OptionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionIssue::InvalidLabels { labels } => {
                write!(f, "Invalid option labels: {}", join_labels(labels))
            }
            OptionIssue::Missing { labels } => {
                write!(f, "Missing options: {}", join_labels(labels))
            }
            OptionIssue::Empty { label } => write!(f, "Option {} is empty", label),
            OptionIssue::DuplicateContent {
                first,
                second,
                content,
            } => write!(f, "Duplicate content in {} and {}: '{}'", first, second, content),
        }
    }
}

fn join_labels(labels: &[char]) -> String {
    labels
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Option problems for a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionFinding {
    pub number: String,
    pub question: String,
    pub issues: Vec<OptionIssue>,
}
