//! The audit pipeline.
//!
//! ```text
//! request ─┬─ PatternObserver ──────────┐
//!          ├─ ReferenceListValidator ───┤ flags
//!          └─ CitationMatcher ─ ExternalVerificationService ─ results
//!                                       │
//!               flags + results + words ─ IntegrityScorer ─ report
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::AuditConfig;
use crate::detect::detect_styles;
use crate::domain::{AuditReport, AuditRequest, Result};
use crate::matcher::CitationMatcher;
use crate::obs::{self, AuditSpan};
use crate::observer::PatternObserver;
use crate::reference_list::ReferenceListValidator;
use crate::rules::StyleRuleRegistry;
use crate::scoring::{IntegrityScorer, ScoreInputs};
use crate::verification::ExternalVerificationService;

/// Runs one audit per request; holds no per-request state.
pub struct CitationAuditor {
    registry: Arc<StyleRuleRegistry>,
    observer: PatternObserver,
    validator: ReferenceListValidator,
    matcher: CitationMatcher,
    verifier: ExternalVerificationService,
    scorer: IntegrityScorer,
}

impl CitationAuditor {
    pub fn new(registry: Arc<StyleRuleRegistry>, verifier: ExternalVerificationService) -> Self {
        Self {
            observer: PatternObserver::new(Arc::clone(&registry)),
            validator: ReferenceListValidator::new(Arc::clone(&registry)),
            matcher: CitationMatcher::default(),
            verifier,
            scorer: IntegrityScorer::new(),
            registry,
        }
    }

    /// Auditor wired to the live providers described by `config`.
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let registry = Arc::new(config.rule_registry()?);
        Ok(Self::new(registry, config.verification_service()?))
    }

    pub fn with_matcher(mut self, matcher: CitationMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn registry(&self) -> &StyleRuleRegistry {
        &self.registry
    }

    /// Run the full pipeline. Fails only on invalid input.
    pub async fn audit(&self, request: &AuditRequest) -> Result<AuditReport> {
        request.validate()?;

        let started = Instant::now();
        let audit_id = Uuid::new_v4();
        let id = audit_id.to_string();
        let patterns = &request.inline_patterns;
        let references = request.reference_list.as_ref();

        let (style, flags, pairs) = {
            let _span = AuditSpan::enter(&id);
            let style = self.registry.resolve_style(&request.style);
            obs::emit_audit_started(&id, style.id(), &request.style, patterns.len());

            let mut flags = self.observer.observe_patterns(patterns, style);
            flags.extend(self.observer.detect_mixed_patterns(patterns));
            let inline = flags.len();
            let structural = self.validator.validate(references, style);
            obs::emit_flags_collected(&id, inline, structural.len());
            flags.extend(structural);

            let pairs = self.matcher.match_citations(patterns, references, style);
            (style, flags, pairs)
        };

        let verification_results = self
            .verifier
            .verify_citation_pairs(pairs)
            .instrument(obs::audit_span(&id))
            .await;

        let _span = AuditSpan::enter(&id);
        let integrity_index = self.scorer.score(ScoreInputs {
            flags: &flags,
            results: &verification_results,
            word_count: request.effective_word_count(),
            reference_list_supplied: references.is_some(),
        });
        obs::emit_audit_finished(
            &id,
            started.elapsed().as_millis() as u64,
            integrity_index.total_score,
            integrity_index.confidence.as_str(),
        );

        Ok(AuditReport {
            audit_id,
            style,
            requested_style: request.style.clone(),
            generated_at: Utc::now(),
            flags,
            verification_results,
            detected_styles: detect_styles(patterns),
            integrity_index,
        })
    }
}
