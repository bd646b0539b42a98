//! Rule-based "why is the optimized version better" narrative.
//!
//! Each [`Signal`] is a boolean check over the surface text of both
//! versions plus a pair of bullet lists, one per track. Signals are
//! evaluated in declaration order and are not mutually exclusive; when none
//! fires, a generic five-point narrative is used on both sides.
//!
//! Nothing here understands program semantics. A drop in loop count is
//! narrated as O(n) → O(log n) whether or not that is true.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Label of the track describing the original code.
pub const BRUTE_FORCE_NAME: &str = "Brute Force (Original)";

/// Label of the track describing the optimized code.
pub const OPTIMIZED_NAME: &str = "Optimized Solution";

static LOOP_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"for\s*\(|while\s*\(").expect("loop header pattern"));

/// Two-track explanation of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub brute_force_name: String,
    pub brute_force_points: Vec<String>,
    pub optimized_name: String,
    pub optimized_points: Vec<String>,
    /// Ids of the signals that fired, in evaluation order.
    pub signals: Vec<&'static str>,
}

impl ComparisonResult {
    /// True when no signal fired and the generic narrative was used.
    pub fn is_fallback(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Precomputed facts about an original/optimized pair.
#[derive(Debug, Clone)]
pub struct SignalInput<'a> {
    pub original: &'a str,
    pub optimized: &'a str,
    pub original_loops: usize,
    pub optimized_loops: usize,
    pub original_lines: usize,
    pub optimized_lines: usize,
}

impl<'a> SignalInput<'a> {
    pub fn new(original: &'a str, optimized: &'a str) -> Self {
        Self {
            original,
            optimized,
            original_loops: LOOP_HEADER.find_iter(original).count(),
            optimized_loops: LOOP_HEADER.find_iter(optimized).count(),
            original_lines: original.split('\n').count(),
            optimized_lines: optimized.split('\n').count(),
        }
    }
}

/// Bullets contributed by one signal: `(brute force, optimized)`.
pub type Narrative = (Vec<String>, Vec<String>);

/// A heuristic over both texts and the paired bullets it contributes.
#[derive(Debug, Clone, Copy)]
pub struct Signal {
    /// Stable identifier.
    pub id: &'static str,

    /// Human-readable name.
    pub name: &'static str,

    /// Whether the signal fires for this pair.
    pub fires: fn(&SignalInput<'_>) -> bool,

    /// Bullets appended to each track when it fires.
    pub narrate: fn(&SignalInput<'_>) -> Narrative,
}

/// Ordered collection of explanation signals.
pub struct SignalSet {
    pub signals: Vec<Signal>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self {
            signals: create_all_signals(),
        }
    }

    /// Get a signal by ID.
    pub fn get(&self, id: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id == id)
    }

    /// Run every signal against the pair and assemble both tracks.
    pub fn explain(&self, original: &str, optimized: &str) -> ComparisonResult {
        let input = SignalInput::new(original, optimized);

        let mut brute_force_points = Vec::new();
        let mut optimized_points = Vec::new();
        let mut fired = Vec::new();

        for signal in &self.signals {
            if (signal.fires)(&input) {
                let (brute, opt) = (signal.narrate)(&input);
                brute_force_points.extend(brute);
                optimized_points.extend(opt);
                fired.push(signal.id);
            }
        }

        if brute_force_points.is_empty() {
            let (brute, opt) = fallback_narrative();
            brute_force_points = brute;
            optimized_points = opt;
        }

        debug!(signals = ?fired, "explanation assembled");

        ComparisonResult {
            brute_force_name: BRUTE_FORCE_NAME.to_string(),
            brute_force_points,
            optimized_name: OPTIMIZED_NAME.to_string(),
            optimized_points,
            signals: fired,
        }
    }
}

impl Default for SignalSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Explain `optimized` against `original` with the built-in signals.
pub fn explain(original: &str, optimized: &str) -> ComparisonResult {
    SignalSet::new().explain(original, optimized)
}

fn bullets(points: &[&str]) -> Vec<String> {
    points.iter().map(|p| (*p).to_string()).collect()
}

fn create_all_signals() -> Vec<Signal> {
    vec![
        Signal {
            id: "new_imports",
            name: "New Imports",
            fires: |i| i.optimized.contains("import") && !i.original.contains("import"),
            narrate: |_| {
                (
                    bullets(&["Manual implementation without external utilities"]),
                    bullets(&["Uses optimized utility classes and imports"]),
                )
            },
        },
        Signal {
            id: "loop_count",
            name: "Fewer Loops",
            fires: |i| i.original_loops > i.optimized_loops,
            narrate: |i| {
                (
                    vec![
                        format!(
                            "Uses nested loops ({} loop(s)) to iterate through data",
                            i.original_loops
                        ),
                        "Checks every element, making it slow for large datasets".to_string(),
                        "Time complexity: O(n) - gets slower as data grows".to_string(),
                    ],
                    vec![
                        format!(
                            "Optimized iteration ({} loop(s)) with smart algorithm",
                            i.optimized_loops
                        ),
                        "Uses divide-and-conquer or efficient search algorithms".to_string(),
                        "Time complexity: O(log n) - stays fast even for huge datasets".to_string(),
                    ],
                )
            },
        },
        Signal {
            id: "search_strategy",
            name: "Binary Search",
            fires: |i| i.original.contains("Array") && i.optimized.contains("binary"),
            narrate: |_| {
                (
                    bullets(&[
                        "Linear search: starts from beginning, checks each item one by one",
                        "Example: Looking through entire phonebook for a name",
                        "Takes more steps for bigger numbers",
                    ]),
                    bullets(&[
                        "Binary search: eliminates half the data with each step",
                        "Example: Opening phonebook in middle, eliminates half with each try",
                        "Instant results, even for billions of items",
                    ]),
                )
            },
        },
        Signal {
            id: "bit_manipulation",
            name: "Bit Manipulation",
            fires: |i| {
                i.optimized.contains(">>") || i.optimized.contains("<<") || i.optimized.contains('&')
            },
            narrate: |_| {
                (
                    bullets(&["Uses basic arithmetic operations", "More readable but slower"]),
                    bullets(&[
                        "Uses bit manipulation and bitwise operators",
                        "Works instantly at CPU level - maximum speed",
                    ]),
                )
            },
        },
        Signal {
            id: "null_safety",
            name: "Null Checks",
            fires: |i| i.optimized.contains("== null") && !i.original.contains("== null"),
            narrate: |_| {
                (
                    bullets(&["No safety checks - can crash with bad input"]),
                    bullets(&["Includes null/boundary checks - handles edge cases safely"]),
                )
            },
        },
        Signal {
            id: "conciseness",
            name: "Shorter Code",
            fires: |i| (i.optimized_lines as f64) < (i.original_lines as f64) * 0.8,
            narrate: |_| {
                (
                    bullets(&[
                        "Repetitive code with duplicate logic",
                        "Harder to understand and maintain",
                        "More prone to bugs",
                    ]),
                    bullets(&[
                        "Clean, concise implementation",
                        "Easy to understand and modify",
                        "Professional-grade code quality",
                    ]),
                )
            },
        },
    ]
}

fn fallback_narrative() -> Narrative {
    (
        bullets(&[
            "Original approach: straightforward implementation",
            "Processes data step by step sequentially",
            "Works correctly but takes longer for complex tasks",
            "Easy to understand for beginners",
            "Becomes inefficient with large datasets",
        ]),
        bullets(&[
            "Optimized approach: refined algorithm",
            "Uses smart techniques to reduce operations",
            "Significantly faster and more memory-efficient",
            "Professional implementation patterns",
            "Scales well with any dataset size",
        ]),
    )
}
