//! Scholar-Registry: external scholarly registries for citeaudit
//!
//! This crate defines the two collaborator ports the verification service
//! consumes, plus HTTP adapters for them:
//!
//! - [`IdentifierRegistry`]: deterministic DOI resolution ([`CrossrefRegistry`])
//! - [`BibliographicSearch`]: free-text search by title/author/year
//!   ([`OpenAlexSearch`], [`SemanticScholarSearch`]), fanned out by
//!   [`SearchAggregator`]
//!
//! All providers are assumed unreliable. Every call made through this crate
//! is summarised as a [`Provenance`] record.

pub mod aggregator;
pub mod config;
pub mod crossref;
pub mod error;
pub mod fakes;
pub mod openalex;
pub mod semantic_scholar;
pub mod similarity;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use aggregator::{AggregatedSearch, SearchAggregator};
pub use config::RegistryConfig;
pub use crossref::CrossrefRegistry;
pub use error::RegistryError;
pub use openalex::OpenAlexSearch;
pub use semantic_scholar::SemanticScholarSearch;
pub use similarity::title_similarity;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// A scholarly work as reported by a registry or search provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    /// Bare DOI (`10.xxxx/...`), never a resolver URL
    pub doi: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub retracted: bool,
    /// Name of the provider that produced this record
    pub source: String,
}

/// Query used for fallback search when no identifier resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkQuery {
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
}

impl WorkQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            year: None,
        }
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    /// Free-text query string sent to search providers.
    pub fn search_text(&self) -> String {
        match &self.author {
            Some(author) if !author.trim().is_empty() => {
                format!("{} {}", self.title.trim(), author.trim())
            }
            _ => self.title.trim().to_string(),
        }
    }
}

/// A search hit together with its title similarity to the query (0.0 - 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWork {
    pub work: WorkRecord,
    pub similarity: f64,
}

/// Record of a single attempt against an external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Provider name (`crossref`, `openalex`, ...)
    pub source: String,
    pub success: bool,
    pub latency_ms: u64,
    /// Failure description, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Provenance {
    pub fn succeeded(source: &str, latency: Duration) -> Self {
        Self {
            source: source.to_string(),
            success: true,
            latency_ms: latency.as_millis() as u64,
            error: None,
        }
    }

    pub fn failed(source: &str, latency: Duration, error: &dyn std::fmt::Display) -> Self {
        Self {
            source: source.to_string(),
            success: false,
            latency_ms: latency.as_millis() as u64,
            error: Some(error.to_string()),
        }
    }
}

/// Deterministic identifier resolution (DOI registry).
///
/// `Ok(None)` means the registry answered and does not know the identifier.
#[async_trait]
pub trait IdentifierRegistry: Send + Sync {
    /// Stable provider name used in provenance records.
    fn name(&self) -> &str;

    async fn resolve(&self, doi: &str) -> Result<Option<WorkRecord>>;
}

/// Free-text bibliographic search provider.
#[async_trait]
pub trait BibliographicSearch: Send + Sync {
    /// Stable provider name used in provenance records.
    fn name(&self) -> &str;

    /// Return candidate works, best provider-side match first.
    async fn search(&self, query: &WorkQuery) -> Result<Vec<WorkRecord>>;
}

/// Strip a resolver prefix (`https://doi.org/`, `doi:`) and lowercase a DOI.
pub fn normalize_doi(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    for prefix in ["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    lower
}
