//! Citation Integrity Index.

use serde::{Deserialize, Serialize};

/// How much weight the total score can bear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

/// Aggregate 0–100 score with its components and caveats.
///
/// # Invariants
///
/// `total_score` and every component lie in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityIndex {
    pub total_score: u8,
    pub confidence: ConfidenceTier,
    pub style_score: f64,
    pub verification_score: f64,
    pub reference_score: f64,
    pub semantic_score: f64,
    /// Human-readable caveats on how far the score can be trusted
    pub verification_limits: Vec<String>,
}
