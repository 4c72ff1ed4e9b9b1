//! Inline citation patterns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of an inline citation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    /// `[3]`, `[2-4]`, `[1, 5]`
    NumericBracket,
    /// `(Smith, 2020)`, `(Smith et al., 2020)`
    AuthorYear,
    /// `(Smith 42)`
    AuthorPage,
    /// `Smith et al.`
    EtAl,
    /// `et. al.`, `et al` without the period
    EtAlMalformed,
    /// `(Smith & Jones, 2020)`
    AmpersandInParens,
    /// `(Smith and Jones 2020)`
    AndInParens,
    /// Document-wide mix of numeric and author-year markers
    MixedStyle,
}

impl PatternType {
    /// Every pattern shape that can be found in text (excludes `MixedStyle`).
    pub const SCANNABLE: [PatternType; 7] = [
        PatternType::NumericBracket,
        PatternType::AuthorYear,
        PatternType::AuthorPage,
        PatternType::EtAl,
        PatternType::EtAlMalformed,
        PatternType::AmpersandInParens,
        PatternType::AndInParens,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PatternType::NumericBracket => "numeric_bracket",
            PatternType::AuthorYear => "author_year",
            PatternType::AuthorPage => "author_page",
            PatternType::EtAl => "et_al",
            PatternType::EtAlMalformed => "et_al_malformed",
            PatternType::AmpersandInParens => "ampersand_in_parens",
            PatternType::AndInParens => "and_in_parens",
            PatternType::MixedStyle => "mixed_style",
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        PatternType::SCANNABLE
            .into_iter()
            .chain([PatternType::MixedStyle])
            .find(|p| p.id().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An inline citation found by the upstream extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPattern {
    pub pattern_type: PatternType,
    /// Literal marker text, e.g. `(Smith, 2020)`
    pub text: String,
    /// Start offset (inclusive) in the document
    pub start: usize,
    /// End offset (exclusive) in the document
    pub end: usize,
    #[serde(default)]
    pub section: Option<String>,
    /// Sentence or paragraph around the marker, i.e. the claim being cited
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl ExtractedPattern {
    pub fn new(pattern_type: PatternType, text: &str, start: usize, end: usize) -> Self {
        Self {
            pattern_type,
            text: text.to_string(),
            start,
            end,
            section: None,
            context: None,
            confidence: None,
        }
    }

    pub fn with_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }
}
