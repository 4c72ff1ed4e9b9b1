//! Structured observability hooks for audit lifecycle events.
//!
//! This module provides:
//! - Audit-scoped tracing spans via the `AuditSpan` RAII guard
//! - Emission functions for the audit lifecycle: start, flag collection,
//!   verification attempts, finish
//!
//! Events are emitted at `info!` level; failed provider attempts at `warn!`.

use scholar_registry::Provenance;
use tracing::{info, warn};

/// The audit-scoped span, for instrumenting futures.
pub fn audit_span(audit_id: &str) -> tracing::Span {
    tracing::info_span!("citeaudit.audit", audit_id = %audit_id)
}

/// RAII guard that enters an audit-scoped tracing span.
///
/// The guard is not `Send`; hold it over synchronous stages only and use
/// [`audit_span`] with `Instrument` across `.await` points.
///
/// ```ignore
/// let _span = AuditSpan::enter("2b0c...");
/// // every event below carries audit_id = "2b0c..."
/// ```
pub struct AuditSpan {
    _span: tracing::span::EnteredSpan,
}

impl AuditSpan {
    pub fn enter(audit_id: &str) -> Self {
        Self {
            _span: audit_span(audit_id).entered(),
        }
    }
}

/// Emit event: audit started.
pub fn emit_audit_started(audit_id: &str, style: &str, requested_style: &str, citations: usize) {
    info!(
        event = "audit.started",
        audit_id = %audit_id,
        style = %style,
        requested_style = %requested_style,
        citations = citations,
    );
}

/// Emit event: style and structure flags collected.
pub fn emit_flags_collected(audit_id: &str, inline: usize, structural: usize) {
    info!(
        event = "audit.flags_collected",
        audit_id = %audit_id,
        inline = inline,
        structural = structural,
    );
}

/// Emit event: one external lookup finished, successful or not.
pub fn emit_verification_attempt(pattern_index: usize, attempt: &Provenance) {
    if attempt.success {
        info!(
            event = "verification.attempt",
            pattern_index = pattern_index,
            source = %attempt.source,
            latency_ms = attempt.latency_ms,
            success = true,
        );
    } else {
        warn!(
            event = "verification.attempt",
            pattern_index = pattern_index,
            source = %attempt.source,
            latency_ms = attempt.latency_ms,
            success = false,
            error = attempt.error.as_deref().unwrap_or("unknown"),
        );
    }
}

/// Emit event: audit finished with its score.
pub fn emit_audit_finished(audit_id: &str, duration_ms: u64, total_score: u8, confidence: &str) {
    info!(
        event = "audit.finished",
        audit_id = %audit_id,
        duration_ms = duration_ms,
        total_score = total_score,
        confidence = %confidence,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_span_create() {
        let _span = AuditSpan::enter("test-audit-id");
    }
}
