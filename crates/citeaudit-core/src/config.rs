//! Audit configuration.
//!
//! Loaded from a TOML file with `[verification]`, `[registry]` and
//! `[completion]` tables; every field has a default, so a missing file or an
//! empty table is valid. Environment variables override endpoints and keys.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use scholar_registry::{
    BibliographicSearch, CrossrefRegistry, OpenAlexSearch, RegistryConfig, SearchAggregator,
    SemanticScholarSearch,
};
use semantic_claim::{CompletionConfig, OpenAiCompatibleProvider, SemanticClaimService};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Result;
use crate::rules::StyleRuleRegistry;
use crate::verification::{ExternalVerificationService, VerificationConfig};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// TOML rule table replacing the built-in one
    pub rules_path: Option<PathBuf>,
    /// Judge claim support; unset means "only when an API key is configured"
    pub enable_claims: Option<bool>,
    pub verification: VerificationConfig,
    pub registry: RegistryConfig,
    pub completion: CompletionConfig,
}

impl AuditConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(text)?;
        config.verification.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// `path` if given, else defaults; environment overrides applied last.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.registry = self.registry.with_env_overrides();
        self.completion = self.completion.with_env_overrides();
        self
    }

    pub fn claims_enabled(&self) -> bool {
        self.enable_claims
            .unwrap_or_else(|| self.completion.api_key.is_some())
    }

    /// Built-in rules, or the table at `rules_path`.
    pub fn rule_registry(&self) -> Result<StyleRuleRegistry> {
        match &self.rules_path {
            Some(path) => {
                info!(path = %path.display(), "loading style rules");
                StyleRuleRegistry::load(path)
            }
            None => Ok(StyleRuleRegistry::builtin()),
        }
    }

    /// Verification service wired to the live HTTP providers.
    pub fn verification_service(&self) -> Result<ExternalVerificationService> {
        let registry = Arc::new(CrossrefRegistry::new(&self.registry)?);
        let providers: Vec<Arc<dyn BibliographicSearch>> = vec![
            Arc::new(OpenAlexSearch::new(&self.registry)?),
            Arc::new(SemanticScholarSearch::new(&self.registry)?),
        ];
        let search = SearchAggregator::new(providers, self.verification.call_timeout());
        let mut service = ExternalVerificationService::new(registry, search, self.verification.clone());
        if self.claims_enabled() {
            let provider = Arc::new(OpenAiCompatibleProvider::new(self.completion.clone())?);
            let timeout = Duration::from_millis(self.completion.timeout_ms);
            service = service.with_claims(SemanticClaimService::new(provider, timeout));
        }
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AuditConfig::from_toml_str("").unwrap();
        assert_eq!(config, AuditConfig::default());
        assert_eq!(config.verification.min_title_words, 3);
        assert!(config.rules_path.is_none());
    }

    #[test]
    fn test_partial_tables_keep_other_defaults() {
        let config = AuditConfig::from_toml_str(
            r#"
            enable_claims = false

            [verification]
            max_concurrency = 4
            deadline_ms = 30000

            [registry]
            mailto = "lab@example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.verification.max_concurrency, 4);
        assert_eq!(config.verification.deadline_ms, Some(30_000));
        assert_eq!(config.verification.high_similarity, 0.85);
        assert_eq!(config.registry.mailto.as_deref(), Some("lab@example.org"));
        assert_eq!(config.registry.max_results, 5);
        assert!(!config.claims_enabled());
    }

    #[test]
    fn test_invalid_thresholds_rejected_at_load() {
        let err = AuditConfig::from_toml_str("[verification]\nhigh_similarity = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }

    #[test]
    fn test_claims_follow_api_key_by_default() {
        let mut config = AuditConfig::default();
        assert!(!config.claims_enabled());
        config.completion.api_key = Some("sk-test".to_string());
        assert!(config.claims_enabled());
        config.enable_claims = Some(false);
        assert!(!config.claims_enabled());
    }

    #[test]
    fn test_load_from_file_and_rules_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[verification]\nmin_title_words = 5").unwrap();
        let config = AuditConfig::load(file.path()).unwrap();
        assert_eq!(config.verification.min_title_words, 5);
        assert_eq!(config.rule_registry().unwrap(), StyleRuleRegistry::builtin());

        let missing = AuditConfig {
            rules_path: Some(PathBuf::from("/definitely/not/here.toml")),
            ..AuditConfig::default()
        };
        assert!(missing.rule_registry().is_err());
    }
}
