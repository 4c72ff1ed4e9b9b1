//! Error types for scholar-registry

use thiserror::Error;

/// Errors raised while talking to a scholarly registry or search provider.
///
/// None of these escape an audit: the verification service records them as
/// failed provenance entries and moves on.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },

    /// Provider answered but the body did not have the expected shape
    #[error("could not decode {provider} response: {detail}")]
    Decode { provider: String, detail: String },

    /// Call exceeded its time budget
    #[error("{provider} timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },

    /// Every provider behind an aggregator failed
    #[error("all {count} search providers failed")]
    AllProvidersFailed { count: usize },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        RegistryError::Http(err.to_string())
    }
}
