//! Error types for semantic-claim

use thiserror::Error;

/// Errors raised by a completion provider or while reading its answer.
///
/// [`crate::SemanticClaimService`] never returns these to callers; they are
/// folded into an "unrelated, confidence 0" judgment.
#[derive(Error, Debug)]
pub enum ClaimError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("completion provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("completion provider returned no content")]
    EmptyResponse,

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl From<reqwest::Error> for ClaimError {
    fn from(err: reqwest::Error) -> Self {
        ClaimError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for ClaimError {
    fn from(err: serde_json::Error) -> Self {
        ClaimError::MalformedResponse(err.to_string())
    }
}
