//! Links inline citations to reference entries.
//!
//! Numeric styles match on the bracket number; author-year styles match on
//! surname (narrowed by year when the marker has one). First match wins.

pub mod extract;

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::domain::{
    CitationPair, CitationStyle, ExtractedPattern, ReferenceEntry, ReferenceListExtraction,
    UnmatchedReason,
};

pub use extract::{HeuristicExtractor, MetadataExtractor};

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number regex"));
static ENTRY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[(\d+)\]|(\d+)\.)").expect("entry number regex"));
static SURNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{Lu}[\p{L}'’\-]+").expect("surname regex"));
static MARKER_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[a-z]?\b").expect("marker year regex"));

/// Words that can open a parenthetical citation without being a surname.
const LEAD_INS: [&str; 4] = ["See", "Cf", "Also", "Compare"];

/// First number in a numeric marker: `[2-4]` and `[2, 5]` both give 2.
pub fn citation_number(marker: &str) -> Option<u32> {
    FIRST_NUMBER.find(marker).and_then(|m| m.as_str().parse().ok())
}

fn entry_number(raw: &str) -> Option<u32> {
    ENTRY_NUMBER
        .captures(raw)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .and_then(|m| m.as_str().parse().ok())
}

/// Leading surname and optional year of an author-year or author-page marker.
pub fn surname_and_year(marker: &str) -> (Option<String>, Option<String>) {
    let surname = SURNAME
        .find_iter(marker)
        .map(|m| m.as_str())
        .find(|w| !LEAD_INS.contains(w))
        .map(str::to_string);
    let year = MARKER_YEAR
        .captures(marker)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    (surname, year)
}

/// Pairs every inline pattern with at most one reference entry.
#[derive(Clone)]
pub struct CitationMatcher {
    extractor: Arc<dyn MetadataExtractor>,
}

impl std::fmt::Debug for CitationMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationMatcher").finish_non_exhaustive()
    }
}

impl Default for CitationMatcher {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicExtractor::new()))
    }
}

impl CitationMatcher {
    pub fn new(extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self { extractor }
    }

    /// One pair per inline pattern, in input order.
    pub fn match_citations(
        &self,
        inline: &[ExtractedPattern],
        list: Option<&ReferenceListExtraction>,
        style: CitationStyle,
    ) -> Vec<CitationPair> {
        let entries = list.map(|l| l.entries.as_slice()).unwrap_or_default();
        let pairs: Vec<CitationPair> = inline
            .iter()
            .enumerate()
            .map(|(i, pattern)| self.match_one(i, pattern, entries, style))
            .collect();
        debug!(
            style = %style,
            inline = pairs.len(),
            matched = pairs.iter().filter(|p| p.reference.is_some()).count(),
            "citations matched"
        );
        pairs
    }

    fn match_one(
        &self,
        index: usize,
        pattern: &ExtractedPattern,
        entries: &[ReferenceEntry],
        style: CitationStyle,
    ) -> CitationPair {
        if entries.is_empty() {
            return CitationPair::unmatched(index, pattern.clone(), UnmatchedReason::NoReferenceList);
        }
        let found = match style {
            CitationStyle::Ieee => find_numeric(&pattern.text, entries),
            CitationStyle::Apa | CitationStyle::Mla => find_author_year(&pattern.text, entries),
            CitationStyle::Chicago => {
                return CitationPair::unmatched(index, pattern.clone(), UnmatchedReason::UnsupportedStyle);
            }
        };
        match found {
            Some(entry) => {
                let metadata = self.extractor.extract(&entry.raw_text);
                CitationPair::matched(index, pattern.clone(), entry.clone(), metadata)
            }
            None => CitationPair::unmatched(index, pattern.clone(), UnmatchedReason::NoMatchingEntry),
        }
    }
}

fn find_numeric<'a>(marker: &str, entries: &'a [ReferenceEntry]) -> Option<&'a ReferenceEntry> {
    let number = citation_number(marker)?;
    entries
        .iter()
        .find(|e| entry_number(&e.raw_text) == Some(number))
}

fn find_author_year<'a>(marker: &str, entries: &'a [ReferenceEntry]) -> Option<&'a ReferenceEntry> {
    let (surname, year) = surname_and_year(marker);
    let surname = surname?.to_lowercase();
    entries.iter().find(|e| {
        let text = e.raw_text.to_lowercase();
        text.contains(&surname) && year.as_deref().map_or(true, |y| text.contains(y))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternType;

    fn entries(raw: &[&str]) -> ReferenceListExtraction {
        ReferenceListExtraction {
            section_title: "References".to_string(),
            entries: raw
                .iter()
                .enumerate()
                .map(|(i, r)| ReferenceEntry::new(i + 1, r))
                .collect(),
        }
    }

    fn pattern(t: PatternType, text: &str) -> ExtractedPattern {
        ExtractedPattern::new(t, text, 0, text.len())
    }

    #[test]
    fn test_numeric_marker_links_matching_entry() {
        let list = entries(&["[1] A. Author, \"First paper,\" 2019.", "[2] B. Author, \"Second paper,\" 2020."]);
        let pairs = CitationMatcher::default().match_citations(
            &[pattern(PatternType::NumericBracket, "[2]")],
            Some(&list),
            CitationStyle::Ieee,
        );
        assert_eq!(pairs.len(), 1);
        let entry = pairs[0].reference.as_ref().unwrap();
        assert_eq!(entry.index, 2);
        assert_eq!(pairs[0].metadata.title.as_deref(), Some("Second paper"));
    }

    #[test]
    fn test_numeric_ranges_use_first_number() {
        assert_eq!(citation_number("[2-4]"), Some(2));
        assert_eq!(citation_number("[12, 5]"), Some(12));
        assert_eq!(citation_number("[]"), None);
        assert_eq!(entry_number("  3. Smith"), Some(3));
        assert_eq!(entry_number("Smith 3."), None);
    }

    #[test]
    fn test_author_year_narrows_by_year() {
        let list = entries(&[
            "Smith, J. (2018). Older work on graphs.",
            "Smith, J. (2020). Newer work on graphs.",
        ]);
        let pairs = CitationMatcher::default().match_citations(
            &[pattern(PatternType::AuthorYear, "(Smith, 2020)")],
            Some(&list),
            CitationStyle::Apa,
        );
        assert_eq!(pairs[0].reference.as_ref().unwrap().index, 2);
        assert_eq!(pairs[0].metadata.year, Some(2020));
    }

    #[test]
    fn test_author_page_matches_on_surname_only() {
        let list = entries(&["Jones, Kim. “Reading Machines.” Review Quarterly, 2018."]);
        let pairs = CitationMatcher::default().match_citations(
            &[pattern(PatternType::AuthorPage, "(Jones 42)")],
            Some(&list),
            CitationStyle::Mla,
        );
        assert!(pairs[0].reference.is_some());
    }

    #[test]
    fn test_surname_skips_lead_in_words() {
        let (surname, year) = surname_and_year("(See Nakamura et al., 2019b)");
        assert_eq!(surname.as_deref(), Some("Nakamura"));
        assert_eq!(year.as_deref(), Some("2019"));
    }

    #[test]
    fn test_output_length_matches_input_without_reference_list() {
        let inline = vec![
            pattern(PatternType::AuthorYear, "(Smith, 2020)"),
            pattern(PatternType::NumericBracket, "[1]"),
            pattern(PatternType::EtAl, "Smith et al."),
        ];
        let pairs = CitationMatcher::default().match_citations(&inline, None, CitationStyle::Apa);
        assert_eq!(pairs.len(), 3);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.pattern_index, i);
            assert!(pair.reference.is_none());
            assert_eq!(pair.unmatched_reason, Some(UnmatchedReason::NoReferenceList));
        }
    }

    #[test]
    fn test_unmatched_reasons() {
        let list = entries(&["Smith, J. (2020). A title here."]);
        let m = CitationMatcher::default();
        let miss = m.match_citations(&[pattern(PatternType::AuthorYear, "(Brown, 2020)")], Some(&list), CitationStyle::Apa);
        assert_eq!(miss[0].unmatched_reason, Some(UnmatchedReason::NoMatchingEntry));

        let chicago = m.match_citations(&[pattern(PatternType::AuthorYear, "(Smith 2020)")], Some(&list), CitationStyle::Chicago);
        assert_eq!(chicago[0].unmatched_reason, Some(UnmatchedReason::UnsupportedStyle));

        let empty = entries(&[]);
        let none = m.match_citations(&[pattern(PatternType::AuthorYear, "(Smith, 2020)")], Some(&empty), CitationStyle::Apa);
        assert_eq!(none[0].unmatched_reason, Some(UnmatchedReason::NoReferenceList));
    }
}
