//! `.coderefine.toml` discovery and parsing.
//!
//! The nearest `.coderefine.toml` above the first input path supplies
//! defaults for the CLI and per-rule severity overrides for the review
//! engine.
//!
//! # Format
//!
//! ```toml
//! [compare]
//! language = "python"
//! strip_comments = true
//!
//! [review]
//! max_line_length = 120
//! disabled = ["long_line"]
//!
//! [lints]
//! # Default level for every category:
//! all = "warn"
//!
//! # Override individual categories:
//! style = "allow"
//! logic = "deny"
//!
//! # Override individual rules:
//! unused_variable = "deny"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::language::Language;
use crate::review::{ReviewOptions, DEFAULT_MAX_LINE_LENGTH};
use crate::rules::{LintLevel, RuleCategory};

/// File name looked up by [`discover_config`].
pub const CONFIG_FILE_NAME: &str = ".coderefine.toml";

/// `[lints]` severity overrides.
#[derive(Debug, Clone, Default)]
pub struct LintOverrides {
    /// Level applied to every category when set (`all = "warn"`).
    pub all: Option<LintLevel>,

    /// Per-category overrides.
    pub categories: HashMap<RuleCategory, LintLevel>,

    /// Per-rule overrides (rule ID → level).
    pub rules: HashMap<String, LintLevel>,
}

impl LintOverrides {
    /// Resolve the effective [`LintLevel`] for a rule.
    ///
    /// Precedence: rule override, then category override, then `all`.
    /// `None` means the rule keeps its built-in severity.
    pub fn effective_level(&self, rule_id: &str, category: RuleCategory) -> Option<LintLevel> {
        if let Some(&level) = self.rules.get(rule_id) {
            return Some(level);
        }
        if let Some(&level) = self.categories.get(&category) {
            return Some(level);
        }
        self.all
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_none() && self.categories.is_empty() && self.rules.is_empty()
    }
}

/// `[compare]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompareSection {
    /// Fallback language when neither the flag nor the extension decides.
    pub language: Option<Language>,

    /// Strip comments and blank lines before comparing.
    pub strip_comments: bool,
}

/// `[review]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewSection {
    pub max_line_length: usize,
    pub disabled: Vec<String>,
}

impl Default for ReviewSection {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            disabled: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    compare: CompareSection,
    review: ReviewSection,
    lints: toml::value::Table,
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The file this config was loaded from.
    pub source: Option<PathBuf>,
    pub compare: CompareSection,
    pub review: ReviewSection,
    pub lints: LintOverrides,
}

impl Config {
    /// Parse config text. `path` is only used in error messages.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lints = LintOverrides::default();
        merge_lint_table(&mut lints, &raw.lints);

        Ok(Self {
            source: Some(path.to_path_buf()),
            compare: raw.compare,
            review: raw.review,
            lints,
        })
    }

    /// Review engine settings derived from `[review]` and `[lints]`.
    pub fn review_options(&self) -> ReviewOptions {
        ReviewOptions {
            max_line_length: self.review.max_line_length,
            overrides: self.lints.clone(),
            disabled_rules: self.review.disabled.clone(),
        }
    }
}

/// Walk up from `start` and return the first `.coderefine.toml` found.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load a [`Config`] from a file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml(&content, path)
}

/// Discover and load the config governing `path`; defaults when none exists.
pub fn discover_config(path: &Path) -> Result<Config> {
    match find_config_file(path) {
        Some(file) => {
            debug!(config = %file.display(), "using config file");
            load_config(&file)
        }
        None => Ok(Config::default()),
    }
}

/// Parse a TOML value into a [`LintLevel`].
///
/// Accepts `"warn"` and the table form `{ level = "warn" }`.
fn parse_lint_level(value: &toml::Value) -> Option<LintLevel> {
    let raw = match value {
        toml::Value::String(s) => s.as_str(),
        toml::Value::Table(t) => t.get("level")?.as_str()?,
        _ => return None,
    };
    LintLevel::parse(raw).ok()
}

fn merge_lint_table(overrides: &mut LintOverrides, table: &toml::value::Table) {
    for (key, value) in table {
        let Some(level) = parse_lint_level(value) else {
            warn!(key = %key, "ignoring lint entry with unrecognised level");
            continue;
        };

        if key == "all" {
            overrides.all = Some(level);
        } else if let Some(cat) = RuleCategory::from_key(key) {
            overrides.categories.insert(cat, level);
        } else {
            overrides.rules.insert(key.clone(), level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let toml_str = r#"
[compare]
language = "python"
strip_comments = true

[review]
max_line_length = 120
disabled = ["long_line"]

[lints]
all = "warn"
style = "allow"
logic = { level = "deny" }
unused_variable = "deny"
"#;
        let config = Config::from_toml(toml_str, Path::new("test.toml")).unwrap();

        assert_eq!(config.compare.language, Some(Language::Python));
        assert!(config.compare.strip_comments);
        assert_eq!(config.review.max_line_length, 120);
        assert_eq!(config.review.disabled, vec!["long_line".to_string()]);
        assert_eq!(config.lints.all, Some(LintLevel::Warn));
        assert_eq!(
            config.lints.categories.get(&RuleCategory::Style),
            Some(&LintLevel::Allow)
        );
        assert_eq!(
            config.lints.categories.get(&RuleCategory::Logic),
            Some(&LintLevel::Deny)
        );
        assert_eq!(
            config.lints.rules.get("unused_variable"),
            Some(&LintLevel::Deny)
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("", Path::new("empty.toml")).unwrap();
        assert_eq!(config.review.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert!(config.compare.language.is_none());
        assert!(config.lints.is_empty());
    }

    #[test]
    fn unknown_levels_are_skipped() {
        let config =
            Config::from_toml("[lints]\nstyle = \"loud\"\n", Path::new("x.toml")).unwrap();
        assert!(config.lints.is_empty());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = Config::from_toml("[compare\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn effective_level_precedence() {
        let mut overrides = LintOverrides {
            all: Some(LintLevel::Warn),
            ..LintOverrides::default()
        };
        overrides
            .categories
            .insert(RuleCategory::Logic, LintLevel::Deny);
        overrides
            .rules
            .insert("unreachable_code".to_string(), LintLevel::Allow);

        assert_eq!(
            overrides.effective_level("unreachable_code", RuleCategory::Logic),
            Some(LintLevel::Allow)
        );
        assert_eq!(
            overrides.effective_level("bool_literal_compare", RuleCategory::Logic),
            Some(LintLevel::Deny)
        );
        assert_eq!(
            overrides.effective_level("long_line", RuleCategory::Style),
            Some(LintLevel::Warn)
        );
    }

    #[test]
    fn discovers_config_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[review]\nmax_line_length = 80\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("main.py");
        std::fs::write(&file, "print(1)\n").unwrap();

        let config = discover_config(&file).unwrap();
        assert_eq!(config.review.max_line_length, 80);
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        // A parent directory might carry a config; only assert when none is found.
        if find_config_file(dir.path()).is_none() {
            let config = discover_config(dir.path()).unwrap();
            assert!(config.source.is_none());
        }
    }
}
