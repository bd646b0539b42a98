//! 0–100 quality score from review findings and the complexity estimate.

use serde::Serialize;

use crate::complexity::Complexity;
use crate::review::Finding;
use crate::rules::RuleCategory;

const CRITICAL_PENALTY: u32 = 15;
const MAJOR_PENALTY: u32 = 5;
const MINOR_PENALTY: u32 = 2;
const HIGH_COMPLEXITY_PENALTY: u32 = 5;
const QUADRATIC_PENALTY: u32 = 2;

/// A score and the short reasons behind it, best-known reason first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityScore {
    pub score: u32,
    pub reasons: Vec<String>,
}

/// Score a snippet. Syntax findings are critical, practice findings major
/// and style findings minor; logic and complexity findings only count
/// through `complexity`.
pub fn quality_score(findings: &[Finding], complexity: Complexity) -> QualityScore {
    let critical = findings
        .iter()
        .filter(|f| f.category == RuleCategory::Syntax)
        .count() as u32;
    let major = findings
        .iter()
        .filter(|f| f.category == RuleCategory::Practice)
        .count() as u32;
    let minor = findings
        .iter()
        .filter(|f| f.category == RuleCategory::Style)
        .count() as u32;

    let mut penalty = critical * CRITICAL_PENALTY + major * MAJOR_PENALTY + minor * MINOR_PENALTY;
    let mut reasons = Vec::new();
    if critical > 0 {
        reasons.push(format!("{critical} critical issue(s)"));
    }
    if major > 0 {
        reasons.push(format!("{major} major issue(s)"));
    }
    if minor > 0 {
        reasons.push(format!("{minor} minor issue(s)"));
    }

    if complexity.is_high() {
        penalty += HIGH_COMPLEXITY_PENALTY;
        reasons.push("High time complexity".to_string());
    } else if complexity == Complexity::Quadratic {
        penalty += QUADRATIC_PENALTY;
        reasons.push("Quadratic time complexity".to_string());
    }

    let score = 100u32.saturating_sub(penalty);
    let band = if score >= 90 {
        "Good structure and style"
    } else if score >= 70 {
        "Acceptable with some improvements"
    } else {
        "Needs improvement"
    };
    reasons.insert(0, band.to_string());

    QualityScore { score, reasons }
}
