//! Inline citation pattern observer.
//!
//! Pure, regex-based compliance checks: flag inline markers the declared
//! style disallows, and flag documents that mix numeric and author-year
//! citation systems. Same input, same output; no I/O.
//!
//! Two entry points exist for each check: the `observe` / `detect_mixed_styles`
//! pair scans raw text (for extractors and the CLI), while the `*_patterns`
//! pair works on already-extracted markers (what the audit pipeline has).

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::domain::{CitationFlag, CitationStyle, ExtractedPattern, PatternType, Severity, ViolationType};
use crate::rules::StyleRuleRegistry;

/// Rule id of the document-wide mixed-style flag.
pub const MIXED_STYLES_RULE: &str = "global.mixed_styles";

const NAME: &str = r"\p{Lu}[\p{L}'’\-]+";

static PATTERNS: LazyLock<Vec<(PatternType, Regex)>> = LazyLock::new(|| {
    let table = [
        (PatternType::NumericBracket, r"\[\d+(?:\s*[-–,]\s*\d+)*\]".to_string()),
        (
            PatternType::AuthorYear,
            format!(r"\({NAME}(?: et al\.)?,?\s+\d{{4}}[a-z]?(?:,\s*(?:pp?\.\s*)?\d+(?:[-–]\d+)?)?\)"),
        ),
        (
            PatternType::AuthorPage,
            format!(r"\({NAME}(?: et al\.)?\s+\d{{1,3}}(?:[-–]\d+)?\)"),
        ),
        (PatternType::EtAl, format!(r"{NAME} et al\.")),
        // Group 1 is the offending text; the trailing class only rules out "et al."
        (PatternType::EtAlMalformed, r"\b(et\.\s*al\.?|et al)(?:[^.\w]|$)".to_string()),
        (
            PatternType::AmpersandInParens,
            format!(r"\({NAME}\s*&\s*{NAME},?\s+\d{{4}}[a-z]?\)"),
        ),
        (
            PatternType::AndInParens,
            format!(r"\({NAME} and {NAME},?\s+\d+[a-z]?\)"),
        ),
    ];
    table
        .into_iter()
        .map(|(p, src)| (p, Regex::new(&src).expect("citation pattern regex")))
        .collect()
});

/// A pattern occurrence in raw text (character offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern_type: PatternType,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Every occurrence of `pattern` in `text`, in order.
pub fn scan(text: &str, pattern: PatternType) -> Vec<PatternMatch> {
    let Some((_, regex)) = PATTERNS.iter().find(|(p, _)| *p == pattern) else {
        return Vec::new();
    };
    let mut offsets = CharOffsets::new(text);
    regex
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
        .map(|m| PatternMatch {
            pattern_type: pattern,
            text: m.as_str().to_string(),
            start: offsets.char_index(m.start()),
            end: offsets.char_index(m.end()),
        })
        .collect()
}

/// Byte-to-char index conversion over non-decreasing byte offsets.
struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, byte: 0, chars: 0 }
    }

    fn char_index(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            return self.text[..byte].chars().count();
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Flags disallowed inline patterns and mixed citation systems.
#[derive(Debug, Clone)]
pub struct PatternObserver {
    registry: Arc<StyleRuleRegistry>,
}

impl PatternObserver {
    pub fn new(registry: Arc<StyleRuleRegistry>) -> Self {
        Self { registry }
    }

    /// Scan raw text for every pattern `style` disallows.
    ///
    /// One flag per match, ordered by pattern type then offset.
    pub fn observe(&self, text: &str, style: CitationStyle) -> Vec<CitationFlag> {
        let rules = self.registry.rules_for(style);
        rules
            .disallowed
            .iter()
            .flat_map(|pattern| scan(text, *pattern))
            .map(|m| {
                let message = rules.inline_message(m.pattern_type);
                inline_flag(style, m.pattern_type, &m.text, m.start, m.end, None, message)
            })
            .collect()
    }

    /// Flag extracted markers whose type `style` disallows, at their own offsets.
    pub fn observe_patterns(&self, patterns: &[ExtractedPattern], style: CitationStyle) -> Vec<CitationFlag> {
        let rules = self.registry.rules_for(style);
        patterns
            .iter()
            .filter(|p| rules.is_disallowed(p.pattern_type))
            .map(|p| {
                inline_flag(
                    style,
                    p.pattern_type,
                    &p.text,
                    p.start,
                    p.end,
                    p.section.as_deref(),
                    rules.inline_message(p.pattern_type),
                )
            })
            .collect()
    }

    /// One document-wide flag iff raw text has both numeric-bracket and
    /// author-year citations.
    pub fn detect_mixed_styles(&self, text: &str) -> Vec<CitationFlag> {
        let numeric = scan(text, PatternType::NumericBracket).len();
        let author_year = scan(text, PatternType::AuthorYear).len();
        self.mixed_flag(numeric, author_year)
    }

    /// Same rule as [`Self::detect_mixed_styles`], over extracted markers.
    pub fn detect_mixed_patterns(&self, patterns: &[ExtractedPattern]) -> Vec<CitationFlag> {
        let count = |t: PatternType| patterns.iter().filter(|p| p.pattern_type == t).count();
        self.mixed_flag(count(PatternType::NumericBracket), count(PatternType::AuthorYear))
    }

    fn mixed_flag(&self, numeric: usize, author_year: usize) -> Vec<CitationFlag> {
        if numeric >= 1 && author_year >= 1 {
            vec![CitationFlag::new(
                ViolationType::MixedStyles,
                MIXED_STYLES_RULE,
                &self.registry.global_messages().mixed_styles,
                Severity::Warning,
            )]
        } else {
            Vec::new()
        }
    }
}

fn inline_flag(
    style: CitationStyle,
    pattern: PatternType,
    text: &str,
    start: usize,
    end: usize,
    section: Option<&str>,
    message: &str,
) -> CitationFlag {
    CitationFlag::new(
        ViolationType::InlineStyle,
        &format!("{style}.inline.{pattern}"),
        message,
        Severity::Error,
    )
    .with_anchor(text, start, end)
    .with_section(section)
}
