//! Positional line diff.
//!
//! Lines are compared strictly by index. A single inserted line shifts every
//! later index, so everything after it shows up as a removed/added pair.
//! That output shape is relied on by consumers; do not swap in an LCS diff.

use serde::Serialize;

/// How a line changed between the original and optimized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub content: String,
}

impl DiffLine {
    fn new(kind: DiffKind, content: &str) -> Self {
        Self {
            kind,
            content: content.to_string(),
        }
    }
}

/// Compare `original` and `optimized` line by line.
pub fn diff_lines(original: &str, optimized: &str) -> Vec<DiffLine> {
    let original_lines: Vec<&str> = original.split('\n').collect();
    let optimized_lines: Vec<&str> = optimized.split('\n').collect();
    let max_len = original_lines.len().max(optimized_lines.len());

    let mut result = Vec::with_capacity(max_len);
    for i in 0..max_len {
        match (original_lines.get(i), optimized_lines.get(i)) {
            (None, Some(opt)) => result.push(DiffLine::new(DiffKind::Added, opt)),
            (Some(orig), None) => result.push(DiffLine::new(DiffKind::Removed, orig)),
            (Some(orig), Some(opt)) if orig == opt => {
                result.push(DiffLine::new(DiffKind::Unchanged, opt));
            }
            (Some(orig), Some(opt)) => {
                result.push(DiffLine::new(DiffKind::Removed, orig));
                result.push(DiffLine::new(DiffKind::Added, opt));
            }
            (None, None) => break,
        }
    }
    result
}

/// Line counts per [`DiffKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub lines_unchanged: usize,
}

impl DiffStats {
    pub fn from_lines(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line.kind {
                DiffKind::Added => stats.lines_added += 1,
                DiffKind::Removed => stats.lines_removed += 1,
                DiffKind::Unchanged => stats.lines_unchanged += 1,
            }
            stats
        })
    }

    /// True when nothing was added or removed.
    pub fn is_identical(&self) -> bool {
        self.lines_added == 0 && self.lines_removed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lines: &[DiffLine]) -> Vec<(DiffKind, &str)> {
        lines.iter().map(|l| (l.kind, l.content.as_str())).collect()
    }

    #[test]
    fn modified_line_becomes_removed_then_added() {
        let out = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(
            kinds(&out),
            vec![
                (DiffKind::Unchanged, "a"),
                (DiffKind::Removed, "b"),
                (DiffKind::Added, "x"),
                (DiffKind::Unchanged, "c"),
            ]
        );
    }

    #[test]
    fn trailing_lines_are_added() {
        let out = diff_lines("a\nb", "a\nb\nc");
        assert_eq!(
            kinds(&out),
            vec![
                (DiffKind::Unchanged, "a"),
                (DiffKind::Unchanged, "b"),
                (DiffKind::Added, "c"),
            ]
        );
    }

    #[test]
    fn trailing_lines_are_removed() {
        let out = diff_lines("a\nb\nc", "a");
        assert_eq!(
            kinds(&out),
            vec![
                (DiffKind::Unchanged, "a"),
                (DiffKind::Removed, "b"),
                (DiffKind::Removed, "c"),
            ]
        );
    }

    #[test]
    fn insertion_shifts_every_following_line() {
        // Positional, not LCS: one inserted line rewrites the rest.
        let out = diff_lines("a\nb\nc", "x\na\nb\nc");
        let stats = DiffStats::from_lines(&out);
        assert_eq!(stats.lines_unchanged, 0);
        assert_eq!(stats.lines_removed, 3);
        assert_eq!(stats.lines_added, 4);
    }

    #[test]
    fn whitespace_differences_count() {
        let out = diff_lines("  a", "a");
        assert_eq!(
            kinds(&out),
            vec![(DiffKind::Removed, "  a"), (DiffKind::Added, "a")]
        );
    }

    #[test]
    fn blank_lines_are_kept() {
        let out = diff_lines("a\n\nb", "a\n\nb");
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], DiffLine::new(DiffKind::Unchanged, ""));
    }

    #[test]
    fn empty_inputs_yield_one_unchanged_empty_line() {
        let out = diff_lines("", "");
        assert_eq!(kinds(&out), vec![(DiffKind::Unchanged, "")]);
        assert!(DiffStats::from_lines(&out).is_identical());
    }
}
