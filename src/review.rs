//! Review engine: runs the rule set over one snippet.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::complexity::{estimate_complexity, ComplexityReport};
use crate::config::LintOverrides;
use crate::language::Language;
use crate::rules::{Rule, RuleCategory, RuleSet, RuleSeverity};

/// Default for `[review] max_line_length`.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 100;

/// Loop depth at which `deep_nesting` fires.
const DEEP_NESTING_DEPTH: usize = 3;

static C_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:int|float|double|char|short|long|void)\s*\*?\s*(\w+)\s*[;=,]")
        .expect("declaration pattern")
});
static LEADING_RETURN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*return\b[^;]*;").expect("return pattern"));
static PYTHON_EXIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:return|raise|break|continue)\b").expect("exit pattern"));
static PYTHON_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*=(?:[^=]|$)").expect("assignment pattern"));
static PYTHON_FOR_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:async\s+)?for\s+([A-Za-z_]\w*)\s+in\b").expect("for target pattern")
});
static CONDITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:if|while)\s*\((.+)\)").expect("condition pattern"));
static CONTROL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:if|else\s+if|for|while|switch)\s*\(").expect("control header pattern")
});
static FUNCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[\w*<>\[\],]+\s+)+\w+\s*\(.*\)\s*(?:throws\s+[\w.,\s]+)?$")
        .expect("function header pattern")
});
static STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(?:return|break|continue|goto)\b",
        r"|\w[\w\s*]*\w+\s*[=\[(]",
        r"|\w+\s*\(",
        r"|[\w.>\[\]-]+\s*[-+*/%]?=",
        r"|\+\+|--",
        r"|.*\)\s*$)",
    ))
    .expect("statement pattern")
});

const NOT_VARIABLES: &[&str] = &["return", "if", "for", "while", "switch", "main"];

/// A single review finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Line number (1-indexed).
    pub line: usize,

    /// Column start (0-indexed, characters).
    pub column: usize,

    /// Column end (0-indexed, characters).
    pub end_column: usize,

    pub severity: RuleSeverity,
    pub rule_id: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub message: String,
    pub fix_hint: Option<String>,

    /// The trimmed source line that triggered the finding.
    pub snippet: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.line, self.column, self.severity, self.rule_id, self.message
        )
    }
}

/// Engine settings taken from config and command-line flags.
#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub max_line_length: usize,
    pub overrides: LintOverrides,
    /// Rule IDs switched off outright.
    pub disabled_rules: Vec<String>,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            overrides: LintOverrides::default(),
            disabled_rules: Vec::new(),
        }
    }
}

/// Findings and loop analysis for one snippet.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub findings: Vec<Finding>,
    pub complexity: ComplexityReport,
}

/// Runs [`RuleSet`] checks over a snippet.
pub struct ReviewEngine {
    rule_set: RuleSet,
    options: ReviewOptions,
}

impl ReviewEngine {
    pub fn new(options: ReviewOptions) -> Self {
        Self {
            rule_set: RuleSet::new(),
            options,
        }
    }

    /// Review `code` and return its findings sorted by line.
    pub fn review(&self, code: &str, language: Option<Language>) -> ReviewOutcome {
        let complexity = estimate_complexity(code, language);
        let lines: Vec<&str> = code.lines().collect();
        let mut findings = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            for (rule, pattern) in self.rule_set.pattern_rules(language) {
                if let Some(mat) = pattern.find(line) {
                    let column = line[..mat.start()].chars().count();
                    let end_column = line[..mat.end()].chars().count();
                    findings.push(make_finding(rule, idx + 1, column, end_column, line));
                }
            }
        }

        findings.extend(self.check_long_lines(&lines, language));
        findings.extend(self.check_unused_variables(code, &lines, language));
        findings.extend(self.check_unreachable(&lines, language));
        findings.extend(self.check_c_syntax(&lines, language));
        findings.extend(self.check_deep_nesting(&complexity, &lines));

        let mut findings = self.apply_overrides(findings);
        findings.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.rule_id.cmp(&b.rule_id)));

        debug!(
            findings = findings.len(),
            language = ?language,
            "review complete"
        );

        ReviewOutcome {
            findings,
            complexity,
        }
    }

    fn rule(&self, id: &str, language: Option<Language>) -> Option<&Rule> {
        self.rule_set.get(id).filter(|r| r.applies_to(language))
    }

    fn check_long_lines(&self, lines: &[&str], language: Option<Language>) -> Vec<Finding> {
        let Some(rule) = self.rule("long_line", language) else {
            return Vec::new();
        };
        let max = self.options.max_line_length;

        lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let width = line.chars().count();
                (width > max).then(|| {
                    let mut finding = make_finding(rule, idx + 1, max, width, line);
                    finding.message = format!("Line is {width} characters (limit {max}).");
                    finding
                })
            })
            .collect()
    }

    fn check_unused_variables(
        &self,
        code: &str,
        lines: &[&str],
        language: Option<Language>,
    ) -> Vec<Finding> {
        let Some(rule) = self.rule("unused_variable", language) else {
            return Vec::new();
        };
        if language == Some(Language::Python) {
            python_unused_variables(rule, code, lines)
        } else {
            c_unused_variables(rule, code, lines)
        }
    }

    fn check_unreachable(&self, lines: &[&str], language: Option<Language>) -> Vec<Finding> {
        let Some(rule) = self.rule("unreachable_code", language) else {
            return Vec::new();
        };
        let mut findings = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if language == Some(Language::Python) {
                if !PYTHON_EXIT.is_match(line) {
                    continue;
                }
                let indent = leading_width(line);
                let next = lines[idx + 1..]
                    .iter()
                    .enumerate()
                    .find(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));
                if let Some((offset, next_line)) = next {
                    if leading_width(next_line) == indent {
                        let line_no = idx + offset + 2;
                        let mut finding = make_finding(rule, line_no, indent, indent, next_line);
                        finding.message =
                            "Code after return/raise/break/continue is unreachable.".to_string();
                        findings.push(finding);
                    }
                }
            } else {
                if !LEADING_RETURN.is_match(line) {
                    continue;
                }
                let Some(next_line) = lines.get(idx + 1) else {
                    continue;
                };
                let trimmed = next_line.trim();
                if !trimmed.is_empty() && !trimmed.starts_with('}') {
                    let column = leading_width(next_line);
                    findings.push(make_finding(rule, idx + 2, column, column, next_line));
                }
            }
        }

        findings
    }

    /// Delimiter balance, missing `;` and `=` inside `if`/`while` conditions.
    /// Comments are skipped; string literals are not.
    fn check_c_syntax(&self, lines: &[&str], language: Option<Language>) -> Vec<Finding> {
        let unbalanced = self.rule("unbalanced_delimiters", language);
        let semicolon = self.rule("missing_semicolon", language);
        let assignment = self.rule("assignment_in_condition", language);
        if unbalanced.is_none() && semicolon.is_none() && assignment.is_none() {
            return Vec::new();
        }

        let mut findings = Vec::new();
        let mut braces: i64 = 0;
        let mut parens: i64 = 0;

        for (line_no, code) in code_parts(lines) {
            if code.is_empty() {
                continue;
            }
            let raw = lines[line_no - 1];
            braces += delimiter_delta(&code, '{', '}');
            parens += delimiter_delta(&code, '(', ')');

            if let Some(rule) = semicolon {
                if needs_semicolon(&code) {
                    let end = raw.trim_end().chars().count();
                    findings.push(make_finding(rule, line_no, end, end, raw));
                }
            }

            if let Some(rule) = assignment {
                let assigns = CONDITION
                    .captures(&code)
                    .and_then(|caps| caps.get(1))
                    .is_some_and(|cond| has_bare_assignment(cond.as_str()));
                if assigns {
                    let column = leading_width(raw);
                    findings.push(make_finding(rule, line_no, column, column, raw));
                }
            }
        }

        if let Some(rule) = unbalanced {
            let last = lines.len();
            let snippet = lines.last().copied().unwrap_or("");
            for (kind, depth) in [("braces", braces), ("parentheses", parens)] {
                if depth != 0 {
                    let mut finding = make_finding(rule, last, 0, 0, snippet);
                    finding.message =
                        format!("Unbalanced {kind} (depth {depth} at end of file).");
                    findings.push(finding);
                }
            }
        }

        findings
    }

    fn check_deep_nesting(&self, complexity: &ComplexityReport, lines: &[&str]) -> Vec<Finding> {
        let Some(rule) = self.rule_set.get("deep_nesting") else {
            return Vec::new();
        };

        complexity
            .loops
            .iter()
            .filter(|site| site.depth >= DEEP_NESTING_DEPTH)
            .map(|site| {
                let line = lines.get(site.line - 1).copied().unwrap_or("");
                let mut finding = make_finding(rule, site.line, 0, 0, line);
                finding.message = format!(
                    "Loop nested {} deep; consider simplifying.",
                    site.depth
                );
                finding
            })
            .collect()
    }

    /// Apply config overrides and `--disable`d rules.
    fn apply_overrides(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .filter_map(|mut f| {
                if self.options.disabled_rules.iter().any(|id| *id == f.rule_id) {
                    return None;
                }
                if let Some(level) = self.options.overrides.effective_level(&f.rule_id, f.category) {
                    f.severity = level.to_severity()?;
                }
                Some(f)
            })
            .collect()
    }
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new(ReviewOptions::default())
    }
}

/// C-style declarations whose name never appears again in the snippet.
fn c_unused_variables(rule: &Rule, code: &str, lines: &[&str]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        for caps in C_DECLARATION.captures_iter(line) {
            let Some(name) = caps.get(1) else { continue };
            let var = name.as_str();
            if NOT_VARIABLES.contains(&var) {
                continue;
            }
            if word_count(code, var) <= 1 {
                let column = line[..name.start()].chars().count();
                let end_column = line[..name.end()].chars().count();
                let mut finding = make_finding(rule, idx + 1, column, end_column, line);
                finding.message = format!("Variable '{var}' is declared but never used.");
                findings.push(finding);
            }
        }
    }

    findings
}

/// Python names that are only ever assigned (plain `name = ...` or a `for`
/// target) and never read anywhere else in the snippet.
fn python_unused_variables(rule: &Rule, code: &str, lines: &[&str]) -> Vec<Finding> {
    let mut stores: Vec<(usize, &str, usize, usize)> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let target = PYTHON_ASSIGN
            .captures(line)
            .or_else(|| PYTHON_FOR_TARGET.captures(line))
            .and_then(|caps| caps.get(1));
        if let Some(name) = target {
            stores.push((idx, name.as_str(), name.start(), name.end()));
        }
    }

    let mut findings = Vec::new();
    for &(idx, var, start, end) in &stores {
        if var == "_" {
            continue;
        }
        let store_count = stores.iter().filter(|(_, other, _, _)| *other == var).count();
        if word_count(code, var) > store_count {
            continue;
        }
        let line = lines[idx];
        let column = line[..start].chars().count();
        let end_column = line[..end].chars().count();
        let mut finding = make_finding(rule, idx + 1, column, end_column, line);
        finding.message = format!("Variable '{var}' is assigned but never used.");
        findings.push(finding);
    }

    findings
}

fn word_count(code: &str, word: &str) -> usize {
    match Regex::new(&format!(r"\b{}\b", regex::escape(word))) {
        Ok(re) => re.find_iter(code).count(),
        Err(_) => 0,
    }
}

/// Each line's code with `//` and `/* */` comments removed, trimmed and
/// paired with its 1-indexed line number.
fn code_parts(lines: &[&str]) -> Vec<(usize, String)> {
    let mut in_block = false;
    let mut parts = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let mut code = String::new();
        let mut rest: &str = line;
        while !rest.is_empty() {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        in_block = false;
                        rest = &rest[end + 2..];
                    }
                    None => rest = "",
                }
                continue;
            }
            match rest.find('/') {
                Some(pos) if rest[pos..].starts_with("//") => {
                    code.push_str(&rest[..pos]);
                    rest = "";
                }
                Some(pos) if rest[pos..].starts_with("/*") => {
                    code.push_str(&rest[..pos]);
                    in_block = true;
                    rest = &rest[pos + 2..];
                }
                Some(pos) => {
                    code.push_str(&rest[..=pos]);
                    rest = &rest[pos + 1..];
                }
                None => {
                    code.push_str(rest);
                    rest = "";
                }
            }
        }
        parts.push((idx + 1, code.trim().to_string()));
    }

    parts
}

fn delimiter_delta(code: &str, open: char, close: char) -> i64 {
    code.chars().fold(0, |depth, ch| {
        if ch == open {
            depth + 1
        } else if ch == close {
            depth - 1
        } else {
            depth
        }
    })
}

/// Whether a comment-free, trimmed C/Java line looks like a statement that
/// should end with `;`.
fn needs_semicolon(code: &str) -> bool {
    if code.starts_with('#') || code.starts_with('@') {
        return false;
    }
    if code.ends_with(['{', '}', '\\', ':', ';', ',']) {
        return false;
    }
    if CONTROL_HEADER.is_match(code) || FUNCTION_HEADER.is_match(code) {
        return false;
    }
    STATEMENT.is_match(code)
}

/// A single `=` that is not part of `==`, `!=`, `<=`, `>=` or `=>`.
fn has_bare_assignment(condition: &str) -> bool {
    let bytes = condition.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        if b != b'=' {
            return false;
        }
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) && !matches!(next, Some(b'=' | b'>'))
    })
}

fn leading_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn make_finding(rule: &Rule, line: usize, column: usize, end_column: usize, source: &str) -> Finding {
    Finding {
        line,
        column,
        end_column,
        severity: rule.severity,
        rule_id: rule.id.to_string(),
        rule_name: rule.name.to_string(),
        category: rule.category,
        message: rule.description.to_string(),
        fix_hint: rule.fix_hint.map(String::from),
        snippet: source.trim().to_string(),
    }
}
