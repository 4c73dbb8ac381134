pub mod config;
pub mod issues;
pub mod question;
pub mod report;

pub use config::{
    ServerConfig, TagNames, ValidationConfig, XmlcheckConfig, CONFIG_FILE_NAME, DEFAULT_MAX_NUMBER,
};
pub use issues::IssueSet;
pub use question::{OptionFinding, OptionIssue, QuestionRecord, EXPECTED_LABELS, UNKNOWN_NUMBER};
pub use report::{SequenceCheck, ValidationReport};
