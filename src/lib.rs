// xmlcheck - Editorial XML validator
// Checks question/explanation/answer numbering and multiple-choice option integrity

pub mod cli;
pub mod models;
pub mod parser;
pub mod report;
pub mod server;
pub mod utils;
pub mod validator;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use models::{IssueSet, OptionFinding, OptionIssue, QuestionRecord, ValidationReport, XmlcheckConfig};
pub use parser::{Document, ParseMode, XmlError};
pub use validator::{detect_issues, DocumentValidator, ValidationError};
