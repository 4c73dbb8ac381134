use crate::models::{OptionFinding, OptionIssue, QuestionRecord, EXPECTED_LABELS};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// `(x)` marker opening a labeled option span
fn label_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([a-z])\)").expect("label pattern is valid"))
}

/// A labeled span cut out of the concatenated option text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSpan {
    pub label: char,
    /// Trimmed text up to the next marker or the end of the string
    pub content: String,
}

/// Join option blocks into one line, collapsing newlines and tabs to spaces
pub fn concat_option_blocks(blocks: &[String]) -> String {
    blocks.join(" ").replace(['\n', '\t'], " ")
}

/// Split text into `(label)content` spans, in order
pub fn labeled_spans(text: &str) -> Vec<LabeledSpan> {
    let markers: Vec<(usize, usize, char)> = label_marker_re()
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let label = cap.get(1)?.as_str().chars().next()?;
            Some((whole.start(), whole.end(), label))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, &(_, end, label))| {
            let stop = markers.get(i + 1).map_or(text.len(), |next| next.0);
            LabeledSpan {
                label,
                content: text[end..stop].trim().to_string(),
            }
        })
        .collect()
}

/// Check one concatenated option string against the a–d contract
pub fn check_option_text(text: &str) -> Vec<OptionIssue> {
    let spans = labeled_spans(text);

    // First occurrence of each expected label wins; keeps first-seen order
    let mut options: Vec<(char, &str)> = Vec::new();
    for span in &spans {
        if EXPECTED_LABELS.contains(&span.label) && !options.iter().any(|(l, _)| *l == span.label) {
            options.push((span.label, span.content.as_str()));
        }
    }

    let mut issues = Vec::new();

    let invalid: BTreeSet<char> = spans
        .iter()
        .map(|s| s.label)
        .filter(|l| !EXPECTED_LABELS.contains(l))
        .collect();
    if !invalid.is_empty() {
        issues.push(OptionIssue::InvalidLabels {
            labels: invalid.into_iter().collect(),
        });
    }

    let missing: Vec<char> = EXPECTED_LABELS
        .iter()
        .copied()
        .filter(|l| !options.iter().any(|(found, _)| found == l))
        .collect();
    if !missing.is_empty() {
        issues.push(OptionIssue::Missing { labels: missing });
    }

    for (label, content) in &options {
        if content.trim().is_empty() {
            issues.push(OptionIssue::Empty { label: *label });
        }
    }

    let mut seen: HashMap<&str, char> = HashMap::new();
    for (label, content) in &options {
        match seen.get(content) {
            Some(first) => issues.push(OptionIssue::DuplicateContent {
                first: *first,
                second: *label,
                content: content.to_string(),
            }),
            None => {
                seen.insert(*content, *label);
            }
        }
    }

    issues
}

/// Validate every question's options, keeping only questions with issues
pub fn validate_options(records: &[QuestionRecord]) -> Vec<OptionFinding> {
    records
        .iter()
        .filter_map(|record| {
            let issues = check_option_text(&concat_option_blocks(&record.option_blocks));
            if issues.is_empty() {
                None
            } else {
                Some(OptionFinding {
                    number: record.number.clone(),
                    question: record.text.clone(),
                    issues,
                })
            }
        })
        .collect()
}
