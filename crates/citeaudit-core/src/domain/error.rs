//! Error taxonomy for citeaudit-core.
//!
//! Only input and configuration problems are errors. Provider failures are
//! absorbed into the report as failed provenance and never surface here.

/// Errors that can reject an audit or prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("invalid audit request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("registry setup failed: {0}")]
    Registry(#[from] scholar_registry::RegistryError),

    #[error("completion provider setup failed: {0}")]
    Completion(#[from] semantic_claim::ClaimError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for citeaudit-core operations.
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_display() {
        let err = AuditError::InvalidRequest("pattern 3 has end < start".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid audit request"));
        assert!(msg.contains("pattern 3"));
    }

    #[test]
    fn test_toml_error_converts() {
        let err: AuditError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(err.to_string().contains("TOML"));
    }
}
