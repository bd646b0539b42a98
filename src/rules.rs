//! Static review rules for a single snippet.
//!
//! Regex-backed rules are matched line by line; rules without a pattern
//! (`long_line`, `unused_variable`, `unreachable_code`, `deep_nesting` and
//! the C syntax heuristics) are checked by the review engine directly and
//! only carry metadata here.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::language::Language;

/// A review rule with associated metadata.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identifier for the rule.
    pub id: &'static str,

    /// Human-readable name.
    pub name: &'static str,

    /// Category of the rule.
    pub category: RuleCategory,

    /// Default severity of violations.
    pub severity: RuleSeverity,

    /// Message shown for each violation.
    pub description: &'static str,

    /// Regex matched against each line, if the rule is pattern based.
    pub pattern: Option<Regex>,

    /// Languages the rule applies to.
    pub scope: RuleScope,

    /// Suggested fix.
    pub fix_hint: Option<&'static str>,
}

impl Rule {
    /// Whether the rule runs for `language` (`None` = unknown language).
    pub fn applies_to(&self, language: Option<Language>) -> bool {
        match self.scope {
            RuleScope::Any => true,
            RuleScope::Python => language == Some(Language::Python),
            RuleScope::BraceFamily => language != Some(Language::Python),
            RuleScope::CFamily => matches!(language, Some(Language::Cpp | Language::Java)),
        }
    }
}

/// Languages a rule is checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Any,
    Python,
    /// Everything except Python, including unknown languages.
    BraceFamily,
    /// Languages that terminate every statement with `;` (C/C++ and Java).
    CFamily,
}

/// Categories of rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Code that will not compile (unbalanced delimiters, missing `;`).
    Syntax,
    /// Formatting and layout.
    Style,
    /// Idioms and likely mistakes (unused names, `== None`).
    Practice,
    /// Control-flow problems (unreachable code, redundant comparisons).
    Logic,
    /// Algorithmic cost (deeply nested loops).
    Complexity,
}

impl RuleCategory {
    /// Parse a config key such as `style` or `practice`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "syntax" => Some(RuleCategory::Syntax),
            "style" => Some(RuleCategory::Style),
            "practice" => Some(RuleCategory::Practice),
            "logic" => Some(RuleCategory::Logic),
            "complexity" => Some(RuleCategory::Complexity),
            _ => None,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleCategory::Syntax => "syntax",
            RuleCategory::Style => "style",
            RuleCategory::Practice => "practice",
            RuleCategory::Logic => "logic",
            RuleCategory::Complexity => "complexity",
        };
        f.write_str(s)
    }
}

/// Severity of rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleSeverity::Info => "info",
            RuleSeverity::Warning => "warning",
            RuleSeverity::Error => "error",
        };
        f.write_str(s)
    }
}

/// Configured level for a rule or category, as written in `.coderefine.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintLevel {
    /// Do not report.
    Allow,
    /// Report as a warning.
    Warn,
    /// Report as an error.
    Deny,
}

impl LintLevel {
    pub fn parse(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(LintLevel::Allow),
            "warn" => Ok(LintLevel::Warn),
            "deny" | "forbid" => Ok(LintLevel::Deny),
            _ => Err(Error::UnknownLintLevel(s.to_string())),
        }
    }

    /// The severity this level reports at, or `None` when allowed.
    pub fn to_severity(self) -> Option<RuleSeverity> {
        match self {
            LintLevel::Allow => None,
            LintLevel::Warn => Some(RuleSeverity::Warning),
            LintLevel::Deny => Some(RuleSeverity::Error),
        }
    }
}

/// Collection of all review rules.
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            rules: create_all_rules(),
        }
    }

    /// Get a rule by ID.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Pattern-backed rules that apply to `language`.
    pub fn pattern_rules(&self, language: Option<Language>) -> impl Iterator<Item = (&Rule, &Regex)> {
        self.rules
            .iter()
            .filter(move |r| r.applies_to(language))
            .filter_map(|r| r.pattern.as_ref().map(|p| (r, p)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

fn pattern(re: &str) -> Option<Regex> {
    Some(Regex::new(re).expect("built-in rule pattern"))
}

fn create_all_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "long_line",
            name: "Line Too Long",
            category: RuleCategory::Style,
            severity: RuleSeverity::Info,
            description: "Line exceeds the configured maximum length.",
            pattern: None,
            scope: RuleScope::Any,
            fix_hint: Some("Break the expression over several lines"),
        },
        Rule {
            id: "none_equality",
            name: "Compare None With `is`",
            category: RuleCategory::Practice,
            severity: RuleSeverity::Warning,
            description: "Use 'is None' instead of '== None'.",
            pattern: pattern(r"[!=]=\s*None\b"),
            scope: RuleScope::Python,
            fix_hint: Some("if value is None:"),
        },
        Rule {
            id: "len_zero_compare",
            name: "Empty Check Via len()",
            category: RuleCategory::Practice,
            severity: RuleSeverity::Warning,
            description: "Use 'if not seq:' instead of 'if len(seq) == 0'.",
            pattern: pattern(r"\blen\s*\([^()]*\)\s*==\s*0\b"),
            scope: RuleScope::Python,
            fix_hint: Some("if not seq:"),
        },
        Rule {
            id: "bool_literal_compare_py",
            name: "Comparison With Boolean Literal",
            category: RuleCategory::Logic,
            severity: RuleSeverity::Info,
            description: "Compare to True/False; use the expression directly.",
            pattern: pattern(r"[!=]=\s*(?:True|False)\b"),
            scope: RuleScope::Python,
            fix_hint: Some("if flag:"),
        },
        Rule {
            id: "bool_literal_compare",
            name: "Comparison With Boolean Literal",
            category: RuleCategory::Logic,
            severity: RuleSeverity::Info,
            description: "Compare to true/false; use the expression directly.",
            pattern: pattern(r"[!=]==?\s*(?:true|false)\b"),
            scope: RuleScope::BraceFamily,
            fix_hint: Some("if (flag)"),
        },
        Rule {
            id: "unused_variable",
            name: "Unused Variable",
            category: RuleCategory::Practice,
            severity: RuleSeverity::Warning,
            description: "Variable is declared but never used.",
            pattern: None,
            scope: RuleScope::Any,
            fix_hint: Some("Remove the declaration"),
        },
        Rule {
            id: "unbalanced_delimiters",
            name: "Unbalanced Delimiters",
            category: RuleCategory::Syntax,
            severity: RuleSeverity::Error,
            description: "Braces or parentheses are not balanced.",
            pattern: None,
            scope: RuleScope::BraceFamily,
            fix_hint: Some("Close every `{` and `(` that is opened"),
        },
        Rule {
            id: "missing_semicolon",
            name: "Missing Semicolon",
            category: RuleCategory::Syntax,
            severity: RuleSeverity::Error,
            description: "Missing semicolon at end of statement.",
            pattern: None,
            scope: RuleScope::CFamily,
            fix_hint: Some("Terminate the statement with `;`"),
        },
        Rule {
            id: "assignment_in_condition",
            name: "Assignment In Condition",
            category: RuleCategory::Logic,
            severity: RuleSeverity::Warning,
            description: "Possible assignment in condition (use == for comparison?).",
            pattern: None,
            scope: RuleScope::BraceFamily,
            fix_hint: Some("if (x == 0)"),
        },
        Rule {
            id: "unreachable_code",
            name: "Unreachable Code",
            category: RuleCategory::Logic,
            severity: RuleSeverity::Warning,
            description: "Code after return may be unreachable.",
            pattern: None,
            scope: RuleScope::Any,
            fix_hint: Some("Remove the dead statements"),
        },
        Rule {
            id: "deep_nesting",
            name: "Deeply Nested Loop",
            category: RuleCategory::Complexity,
            severity: RuleSeverity::Warning,
            description: "Deep loop nesting may cause high time complexity.",
            pattern: None,
            scope: RuleScope::Any,
            fix_hint: Some("Flatten the loops, exit early, or index the inner lookup"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_unique() {
        let set = RuleSet::new();
        let mut ids: Vec<_> = set.rules.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), set.rules.len());
    }

    #[test]
    fn scope_filters_by_language() {
        let set = RuleSet::new();
        let none_eq = set.get("none_equality").unwrap();
        assert!(none_eq.applies_to(Some(Language::Python)));
        assert!(!none_eq.applies_to(Some(Language::Java)));
        assert!(!none_eq.applies_to(None));

        let unused = set.get("unused_variable").unwrap();
        assert!(unused.applies_to(Some(Language::Cpp)));
        assert!(unused.applies_to(Some(Language::Python)));

        let semicolon = set.get("missing_semicolon").unwrap();
        assert!(semicolon.applies_to(Some(Language::Java)));
        assert!(!semicolon.applies_to(Some(Language::Go)));
        assert!(!semicolon.applies_to(Some(Language::JavaScript)));
        assert!(!semicolon.applies_to(None));
    }

    #[test]
    fn pattern_rules_skip_engine_checks() {
        let set = RuleSet::new();
        let ids: Vec<_> = set
            .pattern_rules(Some(Language::Python))
            .map(|(r, _)| r.id)
            .collect();
        assert_eq!(
            ids,
            vec!["none_equality", "len_zero_compare", "bool_literal_compare_py"]
        );
    }

    #[test]
    fn python_patterns_match_expected_lines() {
        let set = RuleSet::new();
        let re = |id| set.get(id).unwrap().pattern.as_ref().unwrap();
        assert!(re("none_equality").is_match("if x == None:"));
        assert!(re("none_equality").is_match("if x != None:"));
        assert!(!re("none_equality").is_match("if x is None:"));
        assert!(re("len_zero_compare").is_match("if len(items) == 0:"));
        assert!(!re("len_zero_compare").is_match("if len(items) == 10:"));
        assert!(re("bool_literal_compare").is_match("if (done === false) {"));
    }

    #[test]
    fn lint_levels_parse_and_map() {
        assert_eq!(LintLevel::parse("Allow").unwrap(), LintLevel::Allow);
        assert_eq!(LintLevel::parse("forbid").unwrap(), LintLevel::Deny);
        assert!(LintLevel::parse("loud").is_err());
        assert_eq!(LintLevel::Allow.to_severity(), None);
        assert_eq!(LintLevel::Deny.to_severity(), Some(RuleSeverity::Error));
    }

    #[test]
    fn categories_parse_from_keys() {
        assert_eq!(RuleCategory::from_key("style"), Some(RuleCategory::Style));
        assert_eq!(RuleCategory::from_key("syntax"), Some(RuleCategory::Syntax));
        assert_eq!(RuleCategory::from_key("all"), None);
        assert_eq!(RuleCategory::Practice.to_string(), "practice");
    }

    #[test]
    fn severities_render_lowercase_and_order() {
        assert_eq!(RuleSeverity::Warning.to_string(), "warning");
        assert!(RuleSeverity::Error > RuleSeverity::Warning);
        assert!(RuleSeverity::Warning > RuleSeverity::Info);
    }
}
