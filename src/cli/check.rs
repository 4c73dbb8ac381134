use crate::models::ValidationReport;
use crate::validator::DocumentValidator;
use crate::Result;
use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for `xmlcheck check`
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Files or directories to validate
    pub paths: Vec<PathBuf>,
    /// Write the rendered output here instead of stdout
    pub output: Option<PathBuf>,
    pub json: bool,
    /// Treat any finding as a failure
    pub strict: bool,
}

/// Outcome counts across all inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub with_issues: usize,
    /// Inputs that could not be read or parsed
    pub failed: usize,
}

impl CheckSummary {
    /// Process exit code: 1 on parse failures, or on any finding in strict mode
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.failed > 0 || (strict && self.with_issues > 0) {
            1
        } else {
            0
        }
    }
}

/// Expand directories into the `.xml` files below them, sorted
///
/// Explicit file arguments are kept whatever their extension.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_xml(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }
    Ok(inputs)
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

/// Validate every input and print (or write) the reports
pub fn run(validator: &DocumentValidator, options: &CheckOptions) -> Result<CheckSummary> {
    let inputs = collect_inputs(&options.paths)?;
    if inputs.is_empty() {
        anyhow::bail!("No XML files found");
    }

    let mut summary = CheckSummary::default();
    let mut results: Vec<(PathBuf, std::result::Result<ValidationReport, String>)> = Vec::new();

    for path in inputs {
        tracing::debug!(path = %path.display(), "validating");
        summary.checked += 1;
        match validator.validate_file(&path) {
            Ok(report) => {
                if report.has_issues() {
                    summary.with_issues += 1;
                }
                results.push((path, Ok(report)));
            }
            Err(e) => {
                summary.failed += 1;
                eprintln!("{}", format!("✗ {}: {}", path.display(), e).red());
                results.push((path, Err(e.to_string())));
            }
        }
    }

    let rendered = if options.json {
        render_json(&results)?
    } else {
        render_text(&results)
    };

    match &options.output {
        Some(out) => {
            std::fs::write(out, &rendered)
                .with_context(|| format!("Failed to write report to {}", out.display()))?;
            println!("{}", format!("✓ Report written to {}", out.display()).green());
        }
        None => print!("{}", rendered),
    }

    print_summary(&summary);
    Ok(summary)
}

fn render_text(results: &[(PathBuf, std::result::Result<ValidationReport, String>)]) -> String {
    let reports: Vec<(&PathBuf, &ValidationReport)> = results
        .iter()
        .filter_map(|(path, r)| r.as_ref().ok().map(|report| (path, report)))
        .collect();

    if results.len() == 1 {
        return reports
            .first()
            .map(|(_, report)| report.full_report())
            .unwrap_or_default();
    }

    reports
        .iter()
        .map(|(path, report)| format!("==> {} <==\n{}", path.display(), report.full_report()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_json(results: &[(PathBuf, std::result::Result<ValidationReport, String>)]) -> Result<String> {
    let items: Vec<_> = results
        .iter()
        .map(|(path, result)| match result {
            Ok(report) => json!({ "path": path, "report": report, "has_issues": report.has_issues() }),
            Err(error) => json!({ "path": path, "error": error }),
        })
        .collect();
    let mut out = serde_json::to_string_pretty(&items)?;
    out.push('\n');
    Ok(out)
}

fn print_summary(summary: &CheckSummary) {
    let line = format!(
        "{} file(s) checked, {} with issues, {} failed",
        summary.checked, summary.with_issues, summary.failed
    );
    if summary.failed > 0 {
        eprintln!("{}", format!("✗ {}", line).red());
    } else if summary.with_issues > 0 {
        eprintln!("{}", format!("⚠ {}", line).yellow());
    } else {
        eprintln!("{}", format!("✓ {}", line).green());
    }
}
