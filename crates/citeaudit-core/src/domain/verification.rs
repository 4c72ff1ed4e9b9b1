//! Per-citation verification outcome.

use scholar_registry::{Provenance, WorkRecord};
use semantic_claim::{ClaimJudgment, ClaimStatus};
use serde::{Deserialize, Serialize};

use super::reference::UnmatchedReason;

/// Whether the cited work could be shown to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistenceStatus {
    Confirmed,
    NotFound,
    /// Not enough information to look the work up
    Pending,
}

/// Whether the cited work backs the claim made around the citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportStatus {
    Supported,
    Plausible,
    Unrelated,
    Contradictory,
    NotEvaluated,
}

impl From<ClaimStatus> for SupportStatus {
    fn from(status: ClaimStatus) -> Self {
        match status {
            ClaimStatus::Supported => SupportStatus::Supported,
            ClaimStatus::Plausible => SupportStatus::Plausible,
            ClaimStatus::Unrelated => SupportStatus::Unrelated,
            ClaimStatus::Contradictory => SupportStatus::Contradictory,
        }
    }
}

/// Outcome for exactly one inline citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Position of the inline pattern in the request
    pub pattern_index: usize,
    pub citation_text: String,
    pub existence: ExistenceStatus,
    pub support: SupportStatus,
    /// One record per external attempt, in attempt order
    pub provenance: Vec<Provenance>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_work: Option<WorkRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_analysis: Option<ClaimJudgment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched_reason: Option<UnmatchedReason>,
}

impl VerificationResult {
    pub fn new(pattern_index: usize, citation_text: &str, existence: ExistenceStatus, message: &str) -> Self {
        Self {
            pattern_index,
            citation_text: citation_text.to_string(),
            existence,
            support: SupportStatus::NotEvaluated,
            provenance: Vec::new(),
            message: message.to_string(),
            similarity: None,
            found_work: None,
            semantic_analysis: None,
            unmatched_reason: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.existence == ExistenceStatus::Confirmed
    }

    /// Any external attempt for this citation failed.
    pub fn has_service_error(&self) -> bool {
        self.provenance.iter().any(|p| !p.success)
    }
}
