//! Citation Integrity Index.
//!
//! ```text
//! style        = 100 - 5 * max(0, violations - max(1, ceil(words / 500)))
//! verification = 100 * confirmed / total                  (100 with no citations)
//! reference    = 0 without a list, 50 if citations lacked one, else 100
//! semantic     = 100 * max(0, supported - contradictory + 0.8 * plausible) / confirmed
//!                                                         (100 with nothing confirmed)
//! total        = round(0.3 style + 0.3 verification + 0.2 reference + 0.2 semantic)
//! ```

use crate::domain::{
    CitationFlag, ConfidenceTier, ExistenceStatus, IntegrityIndex, SupportStatus, UnmatchedReason,
    VerificationResult,
};

const STYLE_WEIGHT: f64 = 0.30;
const VERIFICATION_WEIGHT: f64 = 0.30;
const REFERENCE_WEIGHT: f64 = 0.20;
const SEMANTIC_WEIGHT: f64 = 0.20;

/// Words of text that earn one free style violation.
const WORDS_PER_ALLOWANCE: usize = 500;
const PENALTY_PER_VIOLATION: f64 = 5.0;
const PLAUSIBLE_CREDIT: f64 = 0.8;

pub const LIMIT_NO_CITATIONS: &str =
    "No citations were found, so existence and support could not be assessed.";
pub const LIMIT_PROVIDER_UNAVAILABLE: &str =
    "One or more verification sources were unavailable; some citations may be under-verified.";
pub const LIMIT_NO_REFERENCE_LIST: &str =
    "No reference list was supplied, so citations could not be linked to references.";

/// Everything the scorer looks at for one audit.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub flags: &'a [CitationFlag],
    pub results: &'a [VerificationResult],
    pub word_count: usize,
    pub reference_list_supplied: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityScorer;

impl IntegrityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, inputs: ScoreInputs<'_>) -> IntegrityIndex {
        let style = style_score(inputs.flags.len(), inputs.word_count);
        let verification = verification_score(inputs.results);
        let reference = reference_score(inputs.results, inputs.reference_list_supplied);
        let semantic = semantic_score(inputs.results);

        let total_score = total_score(style, verification, reference, semantic);

        let service_error = inputs.results.iter().any(VerificationResult::has_service_error);
        let confidence = if inputs.results.is_empty() {
            ConfidenceTier::Low
        } else if service_error {
            ConfidenceTier::Medium
        } else if total_score < 50 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::High
        };

        let mut verification_limits = Vec::new();
        if inputs.results.is_empty() {
            verification_limits.push(LIMIT_NO_CITATIONS.to_string());
        }
        if service_error {
            verification_limits.push(LIMIT_PROVIDER_UNAVAILABLE.to_string());
        }
        if !inputs.reference_list_supplied {
            verification_limits.push(LIMIT_NO_REFERENCE_LIST.to_string());
        }
        let pending = inputs
            .results
            .iter()
            .filter(|r| r.existence == ExistenceStatus::Pending)
            .count();
        if pending > 0 {
            verification_limits.push(format!(
                "{pending} citation(s) lacked enough bibliographic detail to verify."
            ));
        }

        IntegrityIndex {
            total_score,
            confidence,
            style_score: style,
            verification_score: verification,
            reference_score: reference,
            semantic_score: semantic,
            verification_limits,
        }
    }
}

/// Weighted total of the four component scores, rounded into 0..=100.
pub fn total_score(style: f64, verification: f64, reference: f64, semantic: f64) -> u8 {
    let weighted = STYLE_WEIGHT * style
        + VERIFICATION_WEIGHT * verification
        + REFERENCE_WEIGHT * reference
        + SEMANTIC_WEIGHT * semantic;
    weighted.round().clamp(0.0, 100.0) as u8
}

pub fn style_score(violations: usize, word_count: usize) -> f64 {
    let allowance = word_count.div_ceil(WORDS_PER_ALLOWANCE).max(1);
    let excess = violations.saturating_sub(allowance);
    (100.0 - PENALTY_PER_VIOLATION * excess as f64).clamp(0.0, 100.0)
}

pub fn verification_score(results: &[VerificationResult]) -> f64 {
    if results.is_empty() {
        return 100.0;
    }
    let confirmed = results.iter().filter(|r| r.is_confirmed()).count();
    (100.0 * confirmed as f64 / results.len() as f64).clamp(0.0, 100.0)
}

pub fn reference_score(results: &[VerificationResult], reference_list_supplied: bool) -> f64 {
    if !reference_list_supplied {
        return 0.0;
    }
    let lacked_list = results
        .iter()
        .any(|r| r.unmatched_reason == Some(UnmatchedReason::NoReferenceList));
    if lacked_list {
        50.0
    } else {
        100.0
    }
}

pub fn semantic_score(results: &[VerificationResult]) -> f64 {
    let confirmed: Vec<&VerificationResult> = results.iter().filter(|r| r.is_confirmed()).collect();
    if confirmed.is_empty() {
        return 100.0;
    }
    let count = |status: SupportStatus| confirmed.iter().filter(|r| r.support == status).count() as f64;
    let credit = count(SupportStatus::Supported) - count(SupportStatus::Contradictory)
        + PLAUSIBLE_CREDIT * count(SupportStatus::Plausible);
    (100.0 * credit.max(0.0) / confirmed.len() as f64).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Severity, ViolationType};
    use scholar_registry::Provenance;
    use std::time::Duration;

    fn result(existence: ExistenceStatus, support: SupportStatus) -> VerificationResult {
        let mut r = VerificationResult::new(0, "[1]", existence, "");
        r.support = support;
        r
    }

    fn flags(n: usize) -> Vec<CitationFlag> {
        (0..n)
            .map(|_| CitationFlag::new(ViolationType::InlineStyle, "apa.inline.numeric_bracket", "x", Severity::Error))
            .collect()
    }

    #[test]
    fn test_style_score_allowance_scales_with_length() {
        assert_eq!(style_score(0, 0), 100.0);
        assert_eq!(style_score(1, 0), 100.0);
        assert_eq!(style_score(3, 0), 90.0);
        assert_eq!(style_score(3, 1000), 95.0);
        assert_eq!(style_score(3, 1001), 100.0);
        assert_eq!(style_score(100, 10), 0.0);
    }

    #[test]
    fn test_zero_citations_defaults() {
        let index = IntegrityScorer::new().score(ScoreInputs {
            flags: &[],
            results: &[],
            word_count: 2000,
            reference_list_supplied: true,
        });
        assert_eq!(index.verification_score, 100.0);
        assert_eq!(index.semantic_score, 100.0);
        assert_eq!(index.total_score, 100);
        assert_eq!(index.confidence, ConfidenceTier::Low);
        assert_eq!(index.verification_limits, vec![LIMIT_NO_CITATIONS.to_string()]);
    }

    #[test]
    fn test_failing_document_keeps_neutral_semantic() {
        let results = vec![result(ExistenceStatus::NotFound, SupportStatus::NotEvaluated)];
        let index = IntegrityScorer::new().score(ScoreInputs {
            flags: &flags(30),
            results: &results,
            word_count: 100,
            reference_list_supplied: false,
        });
        assert_eq!(index.style_score, 0.0);
        assert_eq!(index.verification_score, 0.0);
        assert_eq!(index.reference_score, 0.0);
        // nothing confirmed, so semantic stays at its neutral 100
        assert_eq!(index.semantic_score, 100.0);
        assert_eq!(index.total_score, 20);
        assert_eq!(index.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn test_total_score_bounds() {
        assert_eq!(total_score(0.0, 0.0, 0.0, 0.0), 0);
        assert_eq!(total_score(100.0, 100.0, 100.0, 100.0), 100);
        assert_eq!(total_score(100.0, 0.0, 0.0, 0.0), 30);
        assert_eq!(total_score(0.0, 0.0, 50.0, 0.0), 10);
    }

    #[test]
    fn test_all_supported_gives_full_marks() {
        let results = vec![
            result(ExistenceStatus::Confirmed, SupportStatus::Supported),
            result(ExistenceStatus::Confirmed, SupportStatus::Supported),
        ];
        let index = IntegrityScorer::new().score(ScoreInputs {
            flags: &[],
            results: &results,
            word_count: 800,
            reference_list_supplied: true,
        });
        assert_eq!(index.total_score, 100);
        assert_eq!(index.confidence, ConfidenceTier::High);
        assert!(index.verification_limits.is_empty());
    }

    #[test]
    fn test_semantic_score_mixes_support_levels() {
        let results = vec![
            result(ExistenceStatus::Confirmed, SupportStatus::Supported),
            result(ExistenceStatus::Confirmed, SupportStatus::Plausible),
            result(ExistenceStatus::Confirmed, SupportStatus::Contradictory),
            result(ExistenceStatus::Confirmed, SupportStatus::NotEvaluated),
            result(ExistenceStatus::NotFound, SupportStatus::NotEvaluated),
        ];
        assert!((semantic_score(&results) - 20.0).abs() < 1e-9);

        let hostile = vec![result(ExistenceStatus::Confirmed, SupportStatus::Contradictory)];
        assert_eq!(semantic_score(&hostile), 0.0);
    }

    #[test]
    fn test_reference_score_levels() {
        let mut unmatched = result(ExistenceStatus::NotFound, SupportStatus::NotEvaluated);
        unmatched.unmatched_reason = Some(UnmatchedReason::NoReferenceList);
        assert_eq!(reference_score(&[unmatched.clone()], false), 0.0);
        assert_eq!(reference_score(&[unmatched], true), 50.0);
        assert_eq!(reference_score(&[], true), 100.0);
    }

    #[test]
    fn test_service_error_gives_medium_confidence() {
        let mut r = result(ExistenceStatus::Confirmed, SupportStatus::Supported);
        r.provenance.push(Provenance::failed("crossref", Duration::from_millis(5), &"503"));
        let index = IntegrityScorer::new().score(ScoreInputs {
            flags: &[],
            results: &[r],
            word_count: 500,
            reference_list_supplied: true,
        });
        assert_eq!(index.confidence, ConfidenceTier::Medium);
        assert!(index
            .verification_limits
            .contains(&LIMIT_PROVIDER_UNAVAILABLE.to_string()));
    }

    #[test]
    fn test_zero_citations_is_low_even_with_service_error() {
        // service errors only exist on results, so with none the tier is low
        let index = IntegrityScorer::new().score(ScoreInputs {
            flags: &flags(2),
            results: &[],
            word_count: 0,
            reference_list_supplied: false,
        });
        assert_eq!(index.confidence, ConfidenceTier::Low);
    }
}
