//! Loop-nesting time-complexity estimate.
//!
//! Brace languages are scanned for loop headers and `{`/`}` pairs; Python is
//! scanned by indentation. The estimate is the deepest loop nesting seen,
//! or "recursive" for a Python function that calls itself. A Python
//! `sorted(...)` call outside nested loops lifts the estimate to
//! `O(n log n)`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::language::Language;

static PAREN_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:for|while)\s*\(").expect("loop pattern"));
static BARE_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:for|while|loop)\b").expect("loop pattern"));
static PYTHON_LOOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?(?:for|while)\b.*:\s*$").expect("loop pattern"));
static PYTHON_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\(").expect("def pattern"));
static INLINE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)\s*(?:->[^:]*)?:(.*)$").expect("inline body pattern"));
static PYTHON_SORTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsorted\s*\(").expect("sorted pattern"));

/// Estimated time complexity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Constant,
    Linear,
    Linearithmic,
    Quadratic,
    CubicOrHigher,
    Recursive,
}

impl Complexity {
    fn from_depth(depth: usize) -> Self {
        match depth {
            0 => Complexity::Constant,
            1 => Complexity::Linear,
            2 => Complexity::Quadratic,
            _ => Complexity::CubicOrHigher,
        }
    }

    /// Cubic-or-worse and recursive code.
    pub fn is_high(self) -> bool {
        matches!(self, Complexity::CubicOrHigher | Complexity::Recursive)
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Constant => "O(1)",
            Complexity::Linear => "O(n)",
            Complexity::Linearithmic => "O(n log n)",
            Complexity::Quadratic => "O(n²)",
            Complexity::CubicOrHigher => "O(n³)+",
            Complexity::Recursive => "O(recursion depth)",
        };
        f.write_str(s)
    }
}

/// A loop header and how deeply it is nested (1 = outermost).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopSite {
    pub line: usize,
    pub depth: usize,
    pub snippet: String,
}

/// Loop sites found in a snippet and the resulting estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityReport {
    pub estimate: Complexity,
    pub max_depth: usize,
    pub loops: Vec<LoopSite>,
    /// Names of functions that call themselves.
    pub recursive_functions: Vec<String>,
    /// Lines (1-indexed) calling `sorted(...)`.
    pub sort_calls: Vec<usize>,
}

/// Estimate the time complexity of `code`.
pub fn estimate_complexity(code: &str, language: Option<Language>) -> ComplexityReport {
    let (loops, recursive_functions, sort_calls) = match language {
        Some(Language::Python) => (python_loops(code), python_recursion(code), python_sorts(code)),
        Some(lang) if lang.has_bare_loop_headers() => {
            (brace_loops(code, &BARE_LOOP), Vec::new(), Vec::new())
        }
        _ => (brace_loops(code, &PAREN_LOOP), Vec::new(), Vec::new()),
    };

    let max_depth = loops.iter().map(|l| l.depth).max().unwrap_or(0);
    let estimate = if !recursive_functions.is_empty() {
        Complexity::Recursive
    } else if !sort_calls.is_empty() && max_depth <= 1 {
        Complexity::Linearithmic
    } else {
        Complexity::from_depth(max_depth)
    };

    debug!(%estimate, max_depth, loops = loops.len(), "complexity estimated");

    ComplexityReport {
        estimate,
        max_depth,
        loops,
        recursive_functions,
        sort_calls,
    }
}

/// Track which open braces belong to loops. A header without a brace on its
/// own line waits for the next `{` unless the line ends the statement.
fn brace_loops(code: &str, header: &Regex) -> Vec<LoopSite> {
    let mut sites = Vec::new();
    let mut open: Vec<bool> = Vec::new();
    let mut pending_loop = false;

    for (idx, line) in code.lines().enumerate() {
        if header.is_match(line) {
            let depth = open.iter().filter(|is_loop| **is_loop).count() + 1;
            sites.push(LoopSite {
                line: idx + 1,
                depth,
                snippet: line.trim().to_string(),
            });
            pending_loop = true;
        }

        for ch in line.chars() {
            match ch {
                '{' => {
                    open.push(pending_loop);
                    pending_loop = false;
                }
                '}' => {
                    open.pop();
                }
                _ => {}
            }
        }

        if line.trim_end().ends_with(';') {
            pending_loop = false;
        }
    }

    sites
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn python_loops(code: &str) -> Vec<LoopSite> {
    let mut sites = Vec::new();
    let mut enclosing: Vec<usize> = Vec::new();

    for (idx, line) in code.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let indent = indent_width(line);
        while enclosing.last().is_some_and(|&outer| outer >= indent) {
            enclosing.pop();
        }
        if PYTHON_LOOP.is_match(line) {
            sites.push(LoopSite {
                line: idx + 1,
                depth: enclosing.len() + 1,
                snippet: line.trim().to_string(),
            });
            enclosing.push(indent);
        }
    }

    sites
}

fn python_recursion(code: &str) -> Vec<String> {
    let lines: Vec<&str> = code.lines().collect();
    let mut recursive = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = PYTHON_DEF.captures(line) else {
            continue;
        };
        let name = &caps[1];
        let def_indent = indent_width(line);
        let Ok(call) = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))) else {
            continue;
        };

        let inline_call = INLINE_BODY
            .captures(line)
            .and_then(|body| body.get(1))
            .is_some_and(|body| call.is_match(body.as_str()));
        let calls_itself = inline_call
            || lines[idx + 1..]
                .iter()
                .filter(|body| !body.trim().is_empty())
                .take_while(|body| indent_width(body) > def_indent)
                .any(|body| call.is_match(body));

        if calls_itself && !recursive.iter().any(|r| r == name) {
            recursive.push(name.to_string());
        }
    }

    recursive
}

fn python_sorts(code: &str) -> Vec<usize> {
    code.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with('#') && PYTHON_SORTED.is_match(line))
        .map(|(idx, _)| idx + 1)
        .collect()
}
