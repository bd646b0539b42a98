//! CodeRefine - compare an original snippet with its optimized rewrite.
//!
//! This crate is the deterministic half of an LLM code-review assistant.
//! Given the code a user submitted and the rewrite a model returned, it
//! produces a positional line diff, added/removed/modified line sets, and a
//! rule-based two-column narrative of why the rewrite is "better". It can
//! also review a single snippet with a small static rule set, estimate its
//! loop-nesting complexity and give it a 0–100 quality score.
//!
//! Every engine is pure and synchronous; nothing here talks to a model.
//!
//! # Usage
//!
//! ```rust
//! use coderefine::{Comparator, Language};
//!
//! let comparator = Comparator::default();
//! let comparison = comparator.compare(
//!     "for (i = 0; i < n; i++) { total += a[i]; }",
//!     "total = sum(a);",
//!     Some(Language::JavaScript),
//! );
//!
//! assert!(!comparison.explanation.brute_force_points.is_empty());
//! ```

pub mod complexity;
pub mod config;
pub mod diff;
pub mod differences;
pub mod error;
pub mod explain;
pub mod language;
pub mod output;
pub mod quality;
pub mod review;
pub mod rules;
pub mod strip;

use std::path::Path;

use serde::Serialize;
use tracing::debug;

pub use complexity::{estimate_complexity, Complexity, ComplexityReport, LoopSite};
pub use config::{Config, LintOverrides};
pub use diff::{diff_lines, DiffKind, DiffLine, DiffStats};
pub use differences::{extract_differences, DifferenceSet};
pub use error::{Error, Result};
pub use explain::{explain, ComparisonResult, Signal, SignalSet};
pub use language::Language;
pub use quality::{quality_score, QualityScore};
pub use review::{Finding, ReviewEngine, ReviewOptions};
pub use rules::{LintLevel, Rule, RuleCategory, RuleSet, RuleSeverity};
pub use strip::strip_comments;

/// Complexity estimate of each side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplexityDelta {
    pub original: Complexity,
    pub optimized: Complexity,
}

/// Everything derived from one original/optimized pair.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub language: Option<Language>,
    pub diff: Vec<DiffLine>,
    pub stats: DiffStats,
    pub differences: DifferenceSet,
    pub explanation: ComparisonResult,
    pub complexity: ComplexityDelta,
}

/// Review results for one snippet.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub language: Option<Language>,
    pub findings: Vec<Finding>,
    pub complexity: ComplexityReport,
    pub quality: QualityScore,
}

/// Comparison options resolved from config and flags.
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Language used when the caller does not pass one.
    pub language: Option<Language>,

    /// Strip comments and blank lines from both sides first.
    pub strip_comments: bool,
}

/// Entry point tying the engines together.
pub struct Comparator {
    options: CompareOptions,
    signals: SignalSet,
    engine: ReviewEngine,
}

impl Comparator {
    pub fn new(options: CompareOptions, review: ReviewOptions) -> Self {
        Self {
            options,
            signals: SignalSet::new(),
            engine: ReviewEngine::new(review),
        }
    }

    /// Build a comparator from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let options = CompareOptions {
            language: config.compare.language,
            strip_comments: config.compare.strip_comments,
        };
        Self::new(options, config.review_options())
    }

    /// Compare two texts. `language` falls back to the configured language.
    pub fn compare(&self, original: &str, optimized: &str, language: Option<Language>) -> Comparison {
        let language = language.or(self.options.language);

        let (original, optimized) = if self.options.strip_comments {
            (
                strip_comments(original, language),
                strip_comments(optimized, language),
            )
        } else {
            (original.to_string(), optimized.to_string())
        };

        let diff = diff_lines(&original, &optimized);
        let stats = DiffStats::from_lines(&diff);
        let differences = extract_differences(&original, &optimized);
        let explanation = self.signals.explain(&original, &optimized);
        let complexity = ComplexityDelta {
            original: estimate_complexity(&original, language).estimate,
            optimized: estimate_complexity(&optimized, language).estimate,
        };

        debug!(
            added = stats.lines_added,
            removed = stats.lines_removed,
            signals = explanation.signals.len(),
            "comparison complete"
        );

        Comparison {
            language,
            diff,
            stats,
            differences,
            explanation,
            complexity,
        }
    }

    /// Compare two files. The language comes from `language`, then the
    /// original file's extension, then config.
    pub fn compare_files(
        &self,
        original: &Path,
        optimized: &Path,
        language: Option<Language>,
    ) -> Result<Comparison> {
        let original_text = read_source(original)?;
        let optimized_text = read_source(optimized)?;
        let language = language
            .or_else(|| Language::from_path(original))
            .or_else(|| Language::from_path(optimized));
        Ok(self.compare(&original_text, &optimized_text, language))
    }

    /// Review one snippet.
    pub fn review(&self, code: &str, language: Option<Language>) -> ReviewReport {
        let language = language.or(self.options.language);
        let outcome = self.engine.review(code, language);
        let quality = quality_score(&outcome.findings, outcome.complexity.estimate);

        ReviewReport {
            language,
            findings: outcome.findings,
            complexity: outcome.complexity,
            quality,
        }
    }

    /// Review a file, taking the language from its extension unless given.
    pub fn review_file(&self, path: &Path, language: Option<Language>) -> Result<ReviewReport> {
        let code = read_source(path)?;
        let language = language.or_else(|| Language::from_path(path));
        Ok(self.review(&code, language))
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CompareOptions::default(), ReviewOptions::default())
    }
}

/// Read a source file; CRLF line endings are normalised to `\n`.
pub fn read_source(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(if content.contains("\r\n") {
        content.replace("\r\n", "\n")
    } else {
        content
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_assembles_every_part() {
        let comparison = Comparator::default().compare("a\nb\nc", "a\nx\nc", None);
        assert_eq!(comparison.diff.len(), 4);
        assert_eq!(comparison.stats.lines_added, 1);
        assert_eq!(comparison.stats.lines_removed, 1);
        assert_eq!(comparison.differences.removed, vec!["b".to_string()]);
        assert_eq!(comparison.differences.added, vec!["x".to_string()]);
        assert!(comparison.explanation.is_fallback());
    }

    #[test]
    fn stripping_happens_before_comparing() {
        let comparator = Comparator::new(
            CompareOptions {
                language: Some(Language::Cpp),
                strip_comments: true,
            },
            ReviewOptions::default(),
        );
        let comparison = comparator.compare("// old\nint x = 1;", "int x = 1;\n/* new */", None);
        assert!(comparison.stats.is_identical());
        assert!(comparison.differences.is_empty());
        assert_eq!(comparison.language, Some(Language::Cpp));
    }

    #[test]
    fn complexity_delta_tracks_both_sides() {
        let original = "for (i = 0; i < n; i++) {\n  for (j = 0; j < n; j++) {\n    f(i, j);\n  }\n}";
        let optimized = "for (i = 0; i < n; i++) {\n  g(i);\n}";
        let comparison = Comparator::default().compare(original, optimized, Some(Language::Java));
        assert_eq!(comparison.complexity.original, Complexity::Quadratic);
        assert_eq!(comparison.complexity.optimized, Complexity::Linear);
        assert!(comparison.explanation.signals.contains(&"loop_count"));
    }

    #[test]
    fn review_scores_findings() {
        let report = Comparator::default().review("if x == None:\n    pass\n", Some(Language::Python));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.quality.score, 95);
    }

    #[test]
    fn files_take_language_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("old.py");
        let optimized = dir.path().join("new.py");
        std::fs::write(&original, "# note\r\nx = 1\r\n").unwrap();
        std::fs::write(&optimized, "x = 1\n").unwrap();

        let comparator = Comparator::new(
            CompareOptions {
                language: None,
                strip_comments: true,
            },
            ReviewOptions::default(),
        );
        let comparison = comparator.compare_files(&original, &optimized, None).unwrap();
        assert_eq!(comparison.language, Some(Language::Python));
        assert!(comparison.stats.is_identical());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Comparator::default()
            .review_file(Path::new("/definitely/not/here.rs"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
