//! Registry endpoint configuration

use serde::{Deserialize, Serialize};

/// Endpoints and credentials for the registry adapters.
///
/// Every field has a working public default, so an empty `[registry]` table
/// (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Crossref REST API base URL
    pub crossref_url: String,
    /// OpenAlex API base URL
    pub openalex_url: String,
    /// Semantic Scholar API base URL
    pub semantic_scholar_url: String,
    /// Contact address for the Crossref/OpenAlex polite pools
    pub mailto: Option<String>,
    /// Semantic Scholar API key (optional, raises rate limits)
    pub semantic_scholar_api_key: Option<String>,
    /// Maximum hits requested from each search provider
    pub max_results: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            crossref_url: "https://api.crossref.org".to_string(),
            openalex_url: "https://api.openalex.org".to_string(),
            semantic_scholar_url: "https://api.semanticscholar.org".to_string(),
            mailto: None,
            semantic_scholar_api_key: None,
            max_results: 5,
        }
    }
}

impl RegistryConfig {
    /// Defaults overridden by `CITEAUDIT_*` / provider environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of an existing config.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("CITEAUDIT_CROSSREF_URL") {
            self.crossref_url = url;
        }
        if let Ok(url) = std::env::var("CITEAUDIT_OPENALEX_URL") {
            self.openalex_url = url;
        }
        if let Ok(url) = std::env::var("CITEAUDIT_S2_URL") {
            self.semantic_scholar_url = url;
        }
        if let Ok(mailto) = std::env::var("CITEAUDIT_MAILTO") {
            self.mailto = Some(mailto);
        }
        if let Ok(key) = std::env::var("SEMANTIC_SCHOLAR_API_KEY") {
            self.semantic_scholar_api_key = Some(key);
        }
        self
    }

    /// Set the polite-pool contact address
    pub fn with_mailto(mut self, mailto: &str) -> Self {
        self.mailto = Some(mailto.to_string());
        self
    }
}

/// Build the shared HTTP client used by all adapters.
pub(crate) fn http_client(config: &RegistryConfig) -> crate::Result<reqwest::Client> {
    let agent = match &config.mailto {
        Some(mailto) => format!(
            "citeaudit/{} (mailto:{})",
            env!("CARGO_PKG_VERSION"),
            mailto
        ),
        None => format!("citeaudit/{}", env!("CARGO_PKG_VERSION")),
    };
    Ok(reqwest::Client::builder().user_agent(agent).build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert!(config.crossref_url.starts_with("https://"));
        assert!(config.openalex_url.starts_with("https://"));
        assert_eq!(config.max_results, 5);
        assert!(config.mailto.is_none());
    }

    #[test]
    fn test_registry_config_with_mailto() {
        let config = RegistryConfig::default().with_mailto("lab@example.org");
        assert_eq!(config.mailto.as_deref(), Some("lab@example.org"));
    }

    #[test]
    fn test_http_client_builds() {
        assert!(http_client(&RegistryConfig::default()).is_ok());
    }
}
