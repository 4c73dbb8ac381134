pub mod options;
pub mod sequence;

pub use options::{check_option_text, validate_options};
pub use sequence::detect_issues;

use crate::models::{SequenceCheck, TagNames, ValidationReport, XmlcheckConfig, DEFAULT_MAX_NUMBER};
use crate::parser::numbering::{extract_answer_keys, extract_numbered_elements};
use crate::parser::questions::extract_questions_with_options;
use crate::parser::xml::{read_xml, Document, ParseMode, XmlError};
use std::path::Path;

/// Why a document could not be validated
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("{tag} number {number} exceeds the maximum of {limit}")]
    NumberTooLarge { tag: String, number: u64, limit: u64 },
}

/// Runs the numbering and option checks over one XML export
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    tags: TagNames,
    max_number: u64,
}

impl Default for DocumentValidator {
    fn default() -> Self {
        Self::new(TagNames::default())
    }
}

impl DocumentValidator {
    /// Create a validator for the given element names
    pub fn new(tags: TagNames) -> Self {
        Self {
            tags,
            max_number: DEFAULT_MAX_NUMBER,
        }
    }

    /// Create a validator from the `[tags]` and `[validation]` config sections
    pub fn from_config(config: &XmlcheckConfig) -> Self {
        Self::new(config.tags.clone()).with_max_number(config.validation.max_number)
    }

    /// Reject documents citing a number above `limit`
    pub fn with_max_number(mut self, limit: u64) -> Self {
        self.max_number = limit;
        self
    }

    /// Validate XML text
    ///
    /// Numbering is read from a lenient parse; question/option grouping needs
    /// a strict parse, so a document that is not well-formed fails here.
    pub fn validate_str(&self, xml: &str) -> Result<ValidationReport, ValidationError> {
        let lenient = Document::parse(xml, ParseMode::Lenient)?;

        let questions = extract_numbered_elements(&lenient, &self.tags.question);
        let explanations = extract_numbered_elements(&lenient, &self.tags.explanation);
        let answers = extract_answer_keys(&lenient, &self.tags.answer);
        let answer_numbers: Vec<Option<u64>> = answers.numbers.into_iter().map(Some).collect();

        self.check_bound(&self.tags.question, &questions.numbers)?;
        self.check_bound(&self.tags.explanation, &explanations.numbers)?;
        self.check_bound(&self.tags.answer, &answer_numbers)?;

        let sequences = vec![
            SequenceCheck {
                tag: self.tags.question.clone(),
                issues: detect_issues(questions.numbers.iter().copied()),
                texts: questions.texts,
                numbers: questions.numbers,
            },
            SequenceCheck {
                tag: self.tags.explanation.clone(),
                issues: detect_issues(explanations.numbers.iter().copied()),
                texts: explanations.texts,
                numbers: explanations.numbers,
            },
            SequenceCheck {
                tag: self.tags.answer.clone(),
                issues: detect_issues(answer_numbers.iter().copied()),
                texts: answers.texts,
                numbers: answer_numbers,
            },
        ];

        let strict = Document::parse(xml, ParseMode::Strict)?;
        let records = extract_questions_with_options(&strict, &self.tags);

        Ok(ValidationReport {
            source: None,
            sequences,
            options: validate_options(&records),
        })
    }

    /// Validate a file on disk; the report's `source` is set to its path
    pub fn validate_file(&self, path: &Path) -> Result<ValidationReport, ValidationError> {
        let mut report = self.validate_str(&read_xml(path)?)?;
        report.source = Some(path.display().to_string());
        Ok(report)
    }

    /// The missing-number list spans 1..=max, so max must stay bounded
    fn check_bound(&self, tag: &str, numbers: &[Option<u64>]) -> Result<(), ValidationError> {
        match numbers.iter().flatten().max() {
            Some(&number) if number > self.max_number => Err(ValidationError::NumberTooLarge {
                tag: tag.to_string(),
                number,
                limit: self.max_number,
            }),
            _ => Ok(()),
        }
    }
}
