//! Plain-text rendering of validation results.
//!
//! Layout of the downloadable report:
//! - one block per numbered tag, separated by blank lines
//! - a `---` separator line
//! - the option integrity block

use crate::models::{IssueSet, OptionFinding};

/// File name offered for the downloadable report
pub const REPORT_FILE_NAME: &str = "validation_report.txt";

/// Line emitted when every question has a clean a–d option set
pub const NO_OPTION_ISSUES: &str = "No option issues found.";

/// Plural label for headings: "Question" -> "Questions", "Explanations" stays as is
fn plural(tag: &str) -> String {
    if tag.ends_with('s') {
        tag.to_string()
    } else {
        format!("{}s", tag)
    }
}

fn format_list(values: &[u64]) -> String {
    let items: Vec<String> = values.iter().map(u64::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Render the numbering block for one tag
pub fn build_sequence_report(tag: &str, numbered_count: usize, issues: &IssueSet) -> String {
    let tags = plural(tag);
    let mut lines = vec![
        format!("Validation for {}", tags),
        format!("Total numbered {} found: {}", tags, numbered_count),
    ];

    if !issues.missing.is_empty() {
        lines.push(format!("Missing {} numbers: {}", tag, format_list(&issues.missing)));
    }
    if !issues.duplicates.is_empty() {
        lines.push(format!(
            "Duplicate {} numbers: {}",
            tag,
            format_list(&issues.duplicates)
        ));
    }
    for (prev, curr) in &issues.sequence_errors {
        lines.push(format!(
            "After {} number {}, found {} — sequence is incorrect.",
            tag, prev, curr
        ));
    }
    if issues.is_clean() {
        lines.push(format!("All {} are in correct sequence and unique.", tags));
    }

    lines.join("\n")
}

/// Render option findings as bulleted per-question blocks
pub fn format_option_report(findings: &[OptionFinding]) -> String {
    if findings.is_empty() {
        return NO_OPTION_ISSUES.to_string();
    }

    findings
        .iter()
        .map(|finding| {
            let bullets: Vec<String> = finding.issues.iter().map(|i| i.to_string()).collect();
            format!("Question {} issues:\n  - {}", finding.number, bullets.join("\n  - "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join both sections into the downloadable report
pub fn compose_full_report(sequence_report: &str, option_report: &str) -> String {
    format!("{}\n\n---\n\n{}\n", sequence_report, option_report)
}
