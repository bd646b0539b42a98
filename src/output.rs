//! Output formatters for comparisons and reviews.
//!
//! Pretty output is colored for terminals, JSON is for tooling, and compact
//! prints one line per entry.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::diff::DiffKind;
use crate::review::Finding;
use crate::rules::RuleSeverity;
use crate::{Comparison, ReviewReport};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable colored output.
    Pretty,
    /// JSON output for tooling integration.
    Json,
    /// Compact one-line-per-entry.
    Compact,
}

/// Format a comparison.
pub fn format_comparison(comparison: &Comparison, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => comparison_pretty(comparison),
        OutputFormat::Json => serde_json::to_string_pretty(comparison).unwrap_or_default(),
        OutputFormat::Compact => comparison_compact(comparison),
    }
}

/// Format the reviews of several files. JSON output is a single array of
/// `{file, report}` objects.
pub fn format_reviews(
    reports: &[(PathBuf, ReviewReport)],
    format: OutputFormat,
    show_fixes: bool,
) -> String {
    match format {
        OutputFormat::Pretty => reports
            .iter()
            .map(|(file, report)| review_pretty(file, report, show_fixes))
            .collect(),
        OutputFormat::Json => {
            let values: Vec<_> = reports
                .iter()
                .map(|(file, report)| {
                    serde_json::json!({
                        "file": file.display().to_string(),
                        "report": report,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&values).unwrap_or_default()
        }
        OutputFormat::Compact => reports
            .iter()
            .map(|(file, report)| review_compact(file, &report.findings))
            .collect(),
    }
}

fn comparison_pretty(comparison: &Comparison) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Diff".bold().underline()));
    for line in &comparison.diff {
        let rendered = match line.kind {
            DiffKind::Added => format!("+ {}", line.content).green().to_string(),
            DiffKind::Removed => format!("- {}", line.content).red().to_string(),
            DiffKind::Unchanged => format!("  {}", line.content).dimmed().to_string(),
        };
        output.push_str(&rendered);
        output.push('\n');
    }

    let stats = &comparison.stats;
    if stats.is_identical() {
        output.push_str(&format!("\n{}\n", "No line changes.".dimmed()));
    } else {
        output.push_str(&format!(
            "\n{} {} added, {} removed, {} unchanged\n",
            "Lines:".bold(),
            stats.lines_added.to_string().green().bold(),
            stats.lines_removed.to_string().red().bold(),
            stats.lines_unchanged
        ));
    }

    let differences = &comparison.differences;
    if !differences.is_empty() {
        output.push_str(&format!(
            "\n{} {} added, {} removed, {} modified\n",
            "Differences:".bold(),
            differences.added.len(),
            differences.removed.len(),
            differences.modified.len()
        ));
        for entry in &differences.added {
            output.push_str(&format!("  {} {}\n", "+".green(), entry));
        }
        for entry in &differences.removed {
            output.push_str(&format!("  {} {}\n", "-".red(), entry));
        }
        for entry in &differences.modified {
            output.push_str(&format!("  {} {}\n", "~".yellow(), entry));
        }
    }

    output.push_str(&format!(
        "\n{} {} → {}\n",
        "Complexity:".bold(),
        comparison.complexity.original,
        comparison.complexity.optimized.to_string().green()
    ));

    let explanation = &comparison.explanation;
    if explanation.is_fallback() {
        output.push_str(&format!(
            "\n{}\n",
            "No specific optimization signal detected.".dimmed()
        ));
    }
    output.push_str(&format!("\n{}\n", explanation.brute_force_name.red().bold()));
    for point in &explanation.brute_force_points {
        output.push_str(&format!("  {} {}\n", "•".red(), point));
    }
    output.push_str(&format!("\n{}\n", explanation.optimized_name.green().bold()));
    for point in &explanation.optimized_points {
        output.push_str(&format!("  {} {}\n", "•".green(), point));
    }

    output
}

fn comparison_compact(comparison: &Comparison) -> String {
    let mut output = String::new();

    for line in &comparison.diff {
        let marker = match line.kind {
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
            DiffKind::Unchanged => ' ',
        };
        output.push_str(&format!("{marker}{}\n", line.content));
    }

    let stats = &comparison.stats;
    output.push_str(&format!(
        "stats: +{} -{} ={}\n",
        stats.lines_added, stats.lines_removed, stats.lines_unchanged
    ));
    let differences = &comparison.differences;
    for entry in &differences.added {
        output.push_str(&format!("added: {entry}\n"));
    }
    for entry in &differences.removed {
        output.push_str(&format!("removed: {entry}\n"));
    }
    for entry in &differences.modified {
        output.push_str(&format!("modified: {entry}\n"));
    }
    for point in &comparison.explanation.brute_force_points {
        output.push_str(&format!("original: {point}\n"));
    }
    for point in &comparison.explanation.optimized_points {
        output.push_str(&format!("optimized: {point}\n"));
    }

    output
}

fn review_pretty(file: &Path, report: &ReviewReport, show_fixes: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{}\n",
        file.display().to_string().bold().underline()
    ));

    for finding in &report.findings {
        let label = finding.severity.to_string();
        let severity_str = match finding.severity {
            RuleSeverity::Error => label.red().bold(),
            RuleSeverity::Warning => label.yellow().bold(),
            RuleSeverity::Info => label.blue().bold(),
        };

        output.push_str(&format!(
            "\n  {} {} [{}]\n",
            format!("{}:{}", finding.line, finding.column).dimmed(),
            severity_str,
            finding.rule_id.cyan()
        ));
        output.push_str(&format!("    {} {}\n", "→".dimmed(), finding.rule_name.bold()));
        output.push_str(&format!("    {}\n", finding.message));

        if !finding.snippet.is_empty() {
            output.push_str(&format!(
                "    {} │ {}\n",
                finding.line,
                finding.snippet.dimmed()
            ));
        }

        if show_fixes {
            if let Some(ref fix) = finding.fix_hint {
                output.push_str(&format!("    {} {}\n", "Fix:".green().bold(), fix.green()));
            }
        }
    }

    let quality = &report.quality;
    let score = match quality.score {
        s if s >= 90 => s.to_string().green().bold(),
        s if s >= 70 => s.to_string().yellow().bold(),
        s => s.to_string().red().bold(),
    };
    output.push_str(&format!(
        "\n  {} {}/100 ({})  {} {}\n",
        "Quality:".bold(),
        score,
        quality.reasons.join("; "),
        "Complexity:".bold(),
        report.complexity.estimate
    ));

    output
}

fn review_compact(file: &Path, findings: &[Finding]) -> String {
    let mut output = String::new();

    for finding in findings {
        let severity = match finding.severity {
            RuleSeverity::Error => "E",
            RuleSeverity::Warning => "W",
            RuleSeverity::Info => "I",
        };

        output.push_str(&format!(
            "{}:{}:{}: {} [{}] {}\n",
            file.display(),
            finding.line,
            finding.column,
            severity,
            finding.rule_id,
            finding.message
        ));
    }

    output
}

/// Totals over many review reports.
#[derive(Debug, Default)]
pub struct ReviewSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl ReviewSummary {
    pub fn add(&mut self, findings: &[Finding]) {
        self.files += 1;
        for finding in findings {
            match finding.severity {
                RuleSeverity::Error => self.errors += 1,
                RuleSeverity::Warning => self.warnings += 1,
                RuleSeverity::Info => self.info += 1,
            }
        }
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.info
    }

    pub fn format_pretty(&self) -> String {
        format!(
            "{} in {} file(s) ({} {}, {} {}, {} info)",
            format!("{} findings", self.total()).bold(),
            self.files,
            self.errors.to_string().red().bold(),
            if self.errors == 1 { "error" } else { "errors" },
            self.warnings.to_string().yellow().bold(),
            if self.warnings == 1 {
                "warning"
            } else {
                "warnings"
            },
            self.info
        )
    }
}
