//! In-memory fakes for the registry ports (testing only)
//!
//! Provides `StaticRegistry`, `FailingRegistry`, `StaticSearch` and
//! `FailingSearch`, all of which can share a [`CallLog`] so tests can assert
//! which calls were made and in what order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RegistryError;
use crate::{normalize_doi, BibliographicSearch, IdentifierRegistry, Result, WorkQuery, WorkRecord};

// ---------------------------------------------------------------------------
// CallLog
// ---------------------------------------------------------------------------

/// Shared, ordered record of provider calls (`"<provider>:<argument>"`).
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, provider: &str, argument: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{provider}:{argument}"));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Identifier registries
// ---------------------------------------------------------------------------

/// Registry answering from a fixed DOI → work table.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    works: HashMap<String, WorkRecord>,
    log: CallLog,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work(mut self, doi: &str, work: WorkRecord) -> Self {
        self.works.insert(normalize_doi(doi), work);
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl IdentifierRegistry for StaticRegistry {
    fn name(&self) -> &str {
        "static-registry"
    }

    async fn resolve(&self, doi: &str) -> Result<Option<WorkRecord>> {
        self.log.record(self.name(), doi);
        Ok(self.works.get(&normalize_doi(doi)).cloned())
    }
}

/// Registry whose every call fails with an HTTP error.
#[derive(Debug, Default)]
pub struct FailingRegistry {
    log: CallLog,
}

impl FailingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl IdentifierRegistry for FailingRegistry {
    fn name(&self) -> &str {
        "failing-registry"
    }

    async fn resolve(&self, doi: &str) -> Result<Option<WorkRecord>> {
        self.log.record(self.name(), doi);
        Err(RegistryError::Http("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Search providers
// ---------------------------------------------------------------------------

/// Search provider that returns the same hits for every query, optionally
/// after a delay (use with paused tokio time).
#[derive(Debug)]
pub struct StaticSearch {
    name: String,
    hits: Vec<WorkRecord>,
    delay: Option<Duration>,
    log: CallLog,
}

impl StaticSearch {
    pub fn new(name: &str, hits: Vec<WorkRecord>) -> Self {
        Self {
            name: name.to_string(),
            hits,
            delay: None,
            log: CallLog::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl BibliographicSearch for StaticSearch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &WorkQuery) -> Result<Vec<WorkRecord>> {
        self.log.record(&self.name, &query.title);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.hits.clone())
    }
}

/// Search provider whose every call fails with a 503.
#[derive(Debug)]
pub struct FailingSearch {
    name: String,
    log: CallLog,
}

impl FailingSearch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: CallLog::default(),
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl BibliographicSearch for FailingSearch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &WorkQuery) -> Result<Vec<WorkRecord>> {
        self.log.record(&self.name, &query.title);
        Err(RegistryError::Status {
            provider: self.name.clone(),
            status: 503,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_registry_resolves_normalized_doi() {
        let log = CallLog::new();
        let registry = StaticRegistry::new()
            .with_work(
                "10.1000/ABC",
                WorkRecord {
                    title: "A title".to_string(),
                    ..WorkRecord::default()
                },
            )
            .with_log(log.clone());

        let found = registry.resolve("https://doi.org/10.1000/abc").await.unwrap();
        assert_eq!(found.unwrap().title, "A title");
        assert!(registry.resolve("10.1000/missing").await.unwrap().is_none());
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_fakes_fail() {
        assert!(FailingRegistry::new().resolve("10.1/x").await.is_err());
        assert!(FailingSearch::new("down")
            .search(&WorkQuery::new("x"))
            .await
            .is_err());
    }
}
