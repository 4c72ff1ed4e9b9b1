//! Fan-out over several bibliographic search providers.
//!
//! [`SearchAggregator`] queries every provider concurrently, each under its
//! own timeout, scores every hit against the query title and returns the
//! merged hits best-first together with one [`Provenance`] per provider.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::similarity::title_similarity;
use crate::{BibliographicSearch, Provenance, ScoredWork, WorkQuery};

/// Outcome of an aggregated search.
#[derive(Debug, Clone, Default)]
pub struct AggregatedSearch {
    /// All hits from all providers, highest similarity first.
    pub hits: Vec<ScoredWork>,
    /// One entry per provider, in provider registration order.
    pub attempts: Vec<Provenance>,
}

impl AggregatedSearch {
    /// Best-scoring hit, if any provider returned one.
    pub fn top_hit(&self) -> Option<&ScoredWork> {
        self.hits.first()
    }

    /// `true` when every provider failed (and there was at least one).
    pub fn all_failed(&self) -> bool {
        !self.attempts.is_empty() && self.attempts.iter().all(|a| !a.success)
    }
}

/// Aggregates a list of [`BibliographicSearch`] providers.
pub struct SearchAggregator {
    providers: Vec<Arc<dyn BibliographicSearch>>,
    call_timeout: Duration,
}

impl SearchAggregator {
    pub fn new(providers: Vec<Arc<dyn BibliographicSearch>>, call_timeout: Duration) -> Self {
        Self {
            providers,
            call_timeout,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Query all providers. Never fails: provider errors and timeouts become
    /// failed provenance entries.
    pub async fn search(&self, query: &WorkQuery) -> AggregatedSearch {
        let calls = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let timeout = self.call_timeout;
            async move {
                let started = Instant::now();
                let outcome = match tokio::time::timeout(timeout, provider.search(query)).await {
                    Ok(result) => result,
                    Err(_) => Err(RegistryError::Timeout {
                        provider: provider.name().to_string(),
                        after_ms: timeout.as_millis() as u64,
                    }),
                };
                (provider.name().to_string(), started.elapsed(), outcome)
            }
        });

        let mut result = AggregatedSearch::default();
        for (name, elapsed, outcome) in join_all(calls).await {
            match outcome {
                Ok(works) => {
                    debug!(provider = %name, hits = works.len(), "search provider answered");
                    result.attempts.push(Provenance::succeeded(&name, elapsed));
                    result.hits.extend(works.into_iter().map(|work| ScoredWork {
                        similarity: title_similarity(&query.title, &work.title),
                        work,
                    }));
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "search provider failed");
                    result.attempts.push(Provenance::failed(&name, elapsed, &e));
                }
            }
        }

        // Stable sort keeps provider order among equal scores
        result.hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        result
    }
}
