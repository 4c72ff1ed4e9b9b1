//! Observability tests for audit lifecycle tracing.
//!
//! These check that the structured events for audit start, flag
//! collection, verification attempts and audit finish are emitted.

use std::sync::Arc;
use std::time::Duration;

use citeaudit_core::obs::{
    emit_audit_finished, emit_audit_started, emit_flags_collected, emit_verification_attempt,
    AuditSpan,
};
use citeaudit_core::{
    AuditRequest, CitationAuditor, ExternalVerificationService, ExtractedPattern, PatternType,
    StyleRuleRegistry, VerificationConfig,
};
use scholar_registry::fakes::StaticRegistry;
use scholar_registry::{Provenance, SearchAggregator};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_audit_started_logs_style() {
    emit_audit_started("audit-123", "ieee", "IEEE", 4);
    assert!(logs_contain("audit.started"));
    assert!(logs_contain("audit-123"));
}

#[traced_test]
#[test]
fn test_emit_flags_collected_and_finished() {
    emit_flags_collected("audit-456", 3, 1);
    emit_audit_finished("audit-456", 1200, 87, "high");
    assert!(logs_contain("audit.flags_collected"));
    assert!(logs_contain("audit.finished"));
}

#[traced_test]
#[test]
fn test_failed_attempt_logs_warning_with_error() {
    let attempt = Provenance::failed("crossref", Duration::from_millis(40), &"HTTP 503");
    emit_verification_attempt(2, &attempt);
    assert!(logs_contain("verification.attempt"));
    assert!(logs_contain("HTTP 503"));
}

#[traced_test]
#[test]
fn test_audit_span_scopes_events_to_audit_id() {
    {
        let _span = AuditSpan::enter("test-span-audit");
        tracing::info!("inside audit span");
    }
    tracing::info!("after audit span");
    assert!(logs_contain("citeaudit.audit"));
    assert!(logs_contain("test-span-audit"));
    assert!(logs_contain("after audit span"));
}

#[traced_test]
#[tokio::test]
async fn test_audit_emits_lifecycle_events() {
    let verifier = ExternalVerificationService::new(
        Arc::new(StaticRegistry::new()),
        SearchAggregator::new(vec![], Duration::from_secs(1)),
        VerificationConfig::default(),
    );
    let auditor = CitationAuditor::new(Arc::new(StyleRuleRegistry::builtin()), verifier);
    let request = AuditRequest::new(
        "ieee",
        vec![ExtractedPattern::new(PatternType::NumericBracket, "[1]", 0, 3)],
    );

    let report = auditor.audit(&request).await.unwrap();

    assert!(logs_contain("audit.started"));
    assert!(logs_contain("audit.flags_collected"));
    assert!(logs_contain("audit.finished"));
    assert!(logs_contain(&report.audit_id.to_string()));
}
