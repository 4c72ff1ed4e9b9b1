//! External existence verification.
//!
//! Each matched citation is resolved DOI-first against an identifier
//! registry, then by title search across the aggregated bibliographic
//! providers. Every external attempt leaves a [`Provenance`] entry, and no
//! provider failure ever drops a citation from the output.

pub mod worklist;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use scholar_registry::{IdentifierRegistry, Provenance, RegistryError, SearchAggregator, WorkQuery, WorkRecord};
use semantic_claim::SemanticClaimService;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    AuditError, CitationPair, ExistenceStatus, Result, SupportStatus, UnmatchedReason, VerificationResult,
};
use crate::obs;

pub use worklist::VerificationWorklist;

/// Provenance source recorded for pairs cut off by the overall deadline.
pub const DEADLINE_SOURCE: &str = "deadline";

/// Tuning for [`ExternalVerificationService`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Titles shorter than this are too vague to search for
    pub min_title_words: usize,
    /// Similarity above this is a strong match
    pub high_similarity: f64,
    /// Similarity above this is a weak match; still confirmed
    pub low_similarity: f64,
    /// Bound on every single external call
    pub call_timeout_ms: u64,
    /// Pairs verified at once; 1 means strictly one after another
    pub max_concurrency: usize,
    /// Optional bound on the whole batch
    pub deadline_ms: Option<u64>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            min_title_words: 3,
            high_similarity: 0.85,
            low_similarity: 0.70,
            call_timeout_ms: 10_000,
            max_concurrency: 1,
            deadline_ms: None,
        }
    }
}

impl VerificationConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.high_similarity) || !in_range(self.low_similarity) {
            return Err(AuditError::Config(
                "similarity thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if self.low_similarity > self.high_similarity {
            return Err(AuditError::Config(format!(
                "low_similarity ({}) exceeds high_similarity ({})",
                self.low_similarity, self.high_similarity
            )));
        }
        if self.call_timeout_ms == 0 {
            return Err(AuditError::Config("call_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }
}

/// How closely the best candidate matched the cited title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrength {
    Retracted,
    Strong,
    Weak,
    None,
}

/// Resolves whether matched citations refer to real works.
pub struct ExternalVerificationService {
    registry: Arc<dyn IdentifierRegistry>,
    search: SearchAggregator,
    claims: Option<SemanticClaimService>,
    config: VerificationConfig,
}

impl ExternalVerificationService {
    pub fn new(
        registry: Arc<dyn IdentifierRegistry>,
        search: SearchAggregator,
        config: VerificationConfig,
    ) -> Self {
        Self {
            registry,
            search,
            claims: None,
            config,
        }
    }

    /// Enable support judgments for confirmed works.
    pub fn with_claims(mut self, claims: SemanticClaimService) -> Self {
        self.claims = Some(claims);
        self
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Classify a candidate against the configured thresholds.
    ///
    /// A retracted work only counts when it is itself a match: resolved by
    /// identifier (similarity 1.0) or above the low threshold.
    pub fn classify(&self, similarity: f64, retracted: bool) -> MatchStrength {
        if similarity <= self.config.low_similarity {
            MatchStrength::None
        } else if retracted {
            MatchStrength::Retracted
        } else if similarity > self.config.high_similarity {
            MatchStrength::Strong
        } else if similarity > self.config.low_similarity {
            MatchStrength::Weak
        } else {
            MatchStrength::None
        }
    }

    /// Verify every pair. Output has one result per input pair, in input
    /// order; processing order is last-in-first-out.
    pub async fn verify_citation_pairs(&self, pairs: Vec<CitationPair>) -> Vec<VerificationResult> {
        let started = Instant::now();
        let total = pairs.len();
        let placeholders: Vec<(usize, String)> = pairs
            .iter()
            .map(|p| (p.pattern_index, p.inline.text.clone()))
            .collect();

        let worklist = VerificationWorklist::from_pairs(pairs);
        let mut results = stream::iter(worklist)
            .map(|(slot, pair)| async move { (slot, self.verify_pair(&pair).await) })
            .buffer_unordered(self.config.max_concurrency.max(1));

        let mut slots: Vec<Option<VerificationResult>> = vec![None; total];
        let deadline = self.config.deadline().map(|d| tokio::time::Instant::now() + d);
        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, results.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            remaining = slots.iter().filter(|s| s.is_none()).count(),
                            "verification deadline reached"
                        );
                        break;
                    }
                },
                None => results.next().await,
            };
            match next {
                Some((slot, result)) => slots[slot] = Some(result),
                None => break,
            }
        }
        drop(results);

        slots
            .into_iter()
            .zip(placeholders)
            .map(|(slot, (pattern_index, text))| {
                slot.unwrap_or_else(|| deadline_result(pattern_index, &text, started.elapsed()))
            })
            .collect()
    }

    /// Verify a single pair. Never fails.
    pub async fn verify_pair(&self, pair: &CitationPair) -> VerificationResult {
        let index = pair.pattern_index;
        let text = pair.inline.text.as_str();

        if pair.reference.is_none() {
            let reason = pair.unmatched_reason.unwrap_or(UnmatchedReason::NoMatchingEntry);
            let mut result = VerificationResult::new(index, text, ExistenceStatus::NotFound, unmatched_message(reason));
            result.unmatched_reason = Some(reason);
            return result;
        }

        let meta = &pair.metadata;
        let title = meta.title.as_deref().map(str::trim).unwrap_or_default();
        let words = title.split_whitespace().count();
        if words == 0 || words < self.config.min_title_words {
            return VerificationResult::new(
                index,
                text,
                ExistenceStatus::Pending,
                "Not enough bibliographic information to verify this reference.",
            );
        }

        let mut provenance = Vec::new();
        let mut candidate: Option<(WorkRecord, f64)> = None;

        if let Some(doi) = meta.doi.as_deref() {
            let attempt = self.resolve_doi(doi).await;
            obs::emit_verification_attempt(index, &attempt.0);
            provenance.push(attempt.0);
            if let Some(work) = attempt.1 {
                candidate = Some((work, 1.0));
            }
        }

        if candidate.is_none() {
            let query = WorkQuery::new(title)
                .with_author(meta.author.clone())
                .with_year(meta.year);
            let found = self.search.search(&query).await;
            for attempt in &found.attempts {
                obs::emit_verification_attempt(index, attempt);
            }
            provenance.extend(found.attempts.iter().cloned());
            candidate = found.top_hit().map(|hit| (hit.work.clone(), hit.similarity));
        }

        let mut result = match candidate {
            Some((work, similarity)) => {
                let (existence, message) = match self.classify(similarity, work.retracted) {
                    MatchStrength::Retracted => (
                        ExistenceStatus::Confirmed,
                        format!("Work found in {} but it has been retracted.", work.source),
                    ),
                    MatchStrength::Strong => (
                        ExistenceStatus::Confirmed,
                        format!("Work confirmed in {}.", work.source),
                    ),
                    MatchStrength::Weak => (
                        ExistenceStatus::Confirmed,
                        format!(
                            "Work confirmed in {} with a partial title match ({:.2}).",
                            work.source, similarity
                        ),
                    ),
                    MatchStrength::None => (
                        ExistenceStatus::NotFound,
                        format!("Closest match in {} is not similar enough ({:.2}).", work.source, similarity),
                    ),
                };
                let mut result = VerificationResult::new(index, text, existence, &message);
                result.similarity = Some(similarity);
                if existence == ExistenceStatus::Confirmed {
                    result.found_work = Some(work);
                }
                result
            }
            None if !provenance.is_empty() && provenance.iter().all(|p| !p.success) => {
                VerificationResult::new(
                    index,
                    text,
                    ExistenceStatus::NotFound,
                    "No external source could be reached to verify this reference.",
                )
            }
            None => VerificationResult::new(
                index,
                text,
                ExistenceStatus::NotFound,
                "No matching work was found in external sources.",
            ),
        };
        result.provenance = provenance;

        if result.is_confirmed() {
            self.judge_support(pair, &mut result).await;
        }
        debug!(
            pattern_index = index,
            existence = ?result.existence,
            support = ?result.support,
            attempts = result.provenance.len(),
            "citation verified"
        );
        result
    }

    async fn resolve_doi(&self, doi: &str) -> (Provenance, Option<WorkRecord>) {
        let name = self.registry.name().to_string();
        let timeout = self.config.call_timeout();
        let started = Instant::now();
        let outcome = match tokio::time::timeout(timeout, self.registry.resolve(doi)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RegistryError::Timeout {
                provider: name.clone(),
                after_ms: self.config.call_timeout_ms,
            }),
        };
        match outcome {
            Ok(work) => (Provenance::succeeded(&name, started.elapsed()), work),
            Err(err) => (Provenance::failed(&name, started.elapsed(), &err), None),
        }
    }

    async fn judge_support(&self, pair: &CitationPair, result: &mut VerificationResult) {
        let Some(claims) = &self.claims else {
            return;
        };
        let claim = pair.inline.context.as_deref().map(str::trim).unwrap_or_default();
        let abstract_text = result
            .found_work
            .as_ref()
            .and_then(|w| w.abstract_text.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        if claim.is_empty() || abstract_text.is_empty() {
            return;
        }
        let judgment = claims.verify_claim(claim, abstract_text).await;
        result.support = SupportStatus::from(judgment.status);
        result.semantic_analysis = Some(judgment);
    }
}

fn unmatched_message(reason: UnmatchedReason) -> &'static str {
    match reason {
        UnmatchedReason::NoReferenceList => {
            "No reference list was provided, so this citation could not be linked to a reference entry."
        }
        UnmatchedReason::NoMatchingEntry => "No entry in the reference list matches this citation.",
        UnmatchedReason::UnsupportedStyle => {
            "Linking citations to references is not supported for this citation style."
        }
    }
}

fn deadline_result(pattern_index: usize, text: &str, elapsed: Duration) -> VerificationResult {
    let mut result = VerificationResult::new(
        pattern_index,
        text,
        ExistenceStatus::Pending,
        "Verification did not finish before the audit deadline.",
    );
    result
        .provenance
        .push(Provenance::failed(DEADLINE_SOURCE, elapsed, &"verification deadline exceeded"));
    result
}
