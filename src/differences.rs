//! Added / removed / modified line sets.
//!
//! A line "evolved" into another when the other line contains the first
//! [`SIMILARITY_PREFIX_CHARS`] characters of it, case-insensitively. This
//! is a best-effort lineage guess: short or repeated lines can be paired
//! with the wrong partner, and lines shorter than the prefix are matched on
//! their whole text.

use serde::Serialize;

/// Characters of an original line that must reappear in its modified form.
pub const SIMILARITY_PREFIX_CHARS: usize = 10;

/// Separator between the two halves of a `modified` entry.
pub const MODIFIED_ARROW: &str = " → ";

/// Trimmed lines classified by how they changed. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DifferenceSet {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

impl DifferenceSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Classify the non-blank lines of `original` and `optimized`.
pub fn extract_differences(original: &str, optimized: &str) -> DifferenceSet {
    let original_lines = non_blank_trimmed(original);
    let optimized_lines = non_blank_trimmed(optimized);

    let mut differences = DifferenceSet::default();

    for orig in &original_lines {
        if optimized_lines.contains(orig) {
            continue;
        }
        let prefix: String = orig.to_lowercase().chars().take(SIMILARITY_PREFIX_CHARS).collect();
        match optimized_lines
            .iter()
            .find(|opt| opt.to_lowercase().contains(&prefix))
        {
            Some(similar) => differences
                .modified
                .push(format!("{orig}{MODIFIED_ARROW}{similar}")),
            None => differences.removed.push((*orig).to_string()),
        }
    }

    for opt in &optimized_lines {
        if !original_lines.contains(opt) {
            differences.added.push((*opt).to_string());
        }
    }

    differences
}

fn non_blank_trimmed(code: &str) -> Vec<&str> {
    code.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
