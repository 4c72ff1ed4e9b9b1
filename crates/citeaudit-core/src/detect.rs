//! Advisory fingerprint of the citation styles a document actually uses.

use std::collections::BTreeSet;

use crate::domain::{CitationStyle, ExtractedPattern, PatternType};
use crate::observer::scan;

/// Style a pattern shape points at. Chicago has no fingerprint of its own.
fn fingerprint(pattern: PatternType) -> Option<CitationStyle> {
    match pattern {
        PatternType::NumericBracket => Some(CitationStyle::Ieee),
        PatternType::AuthorPage | PatternType::EtAl => Some(CitationStyle::Mla),
        PatternType::AuthorYear | PatternType::AmpersandInParens => Some(CitationStyle::Apa),
        PatternType::AndInParens | PatternType::EtAlMalformed | PatternType::MixedStyle => None,
    }
}

/// Candidate styles for a set of extracted markers, in style order.
pub fn detect_styles(patterns: &[ExtractedPattern]) -> Vec<CitationStyle> {
    patterns
        .iter()
        .filter_map(|p| fingerprint(p.pattern_type))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Same as [`detect_styles`], scanning raw text.
pub fn detect_styles_in_text(text: &str) -> Vec<CitationStyle> {
    PatternType::SCANNABLE
        .into_iter()
        .filter(|p| !scan(text, *p).is_empty())
        .filter_map(fingerprint)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
