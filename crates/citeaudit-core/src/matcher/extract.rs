//! Best-effort metadata extraction from raw reference entries.

use std::sync::LazyLock;

use regex::Regex;
use scholar_registry::normalize_doi;

use crate::domain::EntryMetadata;

/// Pulls title / author / year / DOI out of a raw bibliography entry.
///
/// Implementations must never fail: anything they cannot find is `None`.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> EntryMetadata;
}

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("year regex"));
static QUOTED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).expect("quoted title regex"));
static TITLE_AFTER_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\d{4}[a-z]?\)\.\s*([^.?!]+[?!]?)").expect("title after year regex")
});
static DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"10\.\d{4,9}/[^\s"<>]+"#).expect("doi regex"));
static ENTRY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[\d+\]|\d+\.)\s*").expect("entry number regex"));

/// Regex heuristics tuned for APA / MLA / IEEE reference entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self
    }

    fn title(raw: &str) -> Option<String> {
        let quoted = QUOTED_TITLE
            .captures(raw)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str());
        let candidate = quoted.or_else(|| {
            TITLE_AFTER_YEAR
                .captures(raw)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        })?;
        let title = candidate.trim().trim_end_matches([',', '.', ';']).trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    fn author(raw: &str) -> Option<String> {
        let body = ENTRY_NUMBER.replace(raw, "");
        let cut = body.find(['(', '"', '“']).unwrap_or(body.len());
        let author = body[..cut].trim().trim_end_matches([',', '.']).trim();
        (!author.is_empty() && cut < body.len()).then(|| author.to_string())
    }

    fn year(raw: &str) -> Option<i32> {
        YEAR.captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    fn doi(raw: &str) -> Option<String> {
        DOI.find(raw)
            .map(|m| normalize_doi(m.as_str().trim_end_matches(['.', ',', ';', ')'])))
    }
}

impl MetadataExtractor for HeuristicExtractor {
    fn extract(&self, raw: &str) -> EntryMetadata {
        EntryMetadata {
            title: Self::title(raw),
            author: Self::author(raw),
            year: Self::year(raw),
            doi: Self::doi(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> EntryMetadata {
        HeuristicExtractor::new().extract(raw)
    }

    #[test]
    fn test_apa_entry() {
        let meta = extract(
            "Smith, J., & Jones, K. (2020). Deep learning for citation analysis. Journal of Things, 4(2), 1-10. https://doi.org/10.1234/jot.2020.42.",
        );
        assert_eq!(meta.title.as_deref(), Some("Deep learning for citation analysis"));
        assert_eq!(meta.author.as_deref(), Some("Smith, J., & Jones, K"));
        assert_eq!(meta.year, Some(2020));
        assert_eq!(meta.doi.as_deref(), Some("10.1234/jot.2020.42"));
    }

    #[test]
    fn test_ieee_entry_with_quoted_title() {
        let meta = extract("[3] J. Smith, \"Graph methods for retrieval,\" in Proc. SIGIR, 2019, pp. 1-9.");
        assert_eq!(meta.title.as_deref(), Some("Graph methods for retrieval"));
        assert_eq!(meta.author.as_deref(), Some("J. Smith"));
        assert_eq!(meta.year, Some(2019));
        assert_eq!(meta.doi, None);
    }

    #[test]
    fn test_mla_entry_with_curly_quotes() {
        let meta = extract("Jones, Kim. “Reading Machines.” Review Quarterly, vol. 3, 2018.");
        assert_eq!(meta.title.as_deref(), Some("Reading Machines"));
        assert_eq!(meta.author.as_deref(), Some("Jones, Kim"));
        assert_eq!(meta.year, Some(2018));
    }

    #[test]
    fn test_garbage_yields_absent_fields() {
        let meta = extract("???");
        assert_eq!(meta, EntryMetadata::default());
        assert_eq!(extract(""), EntryMetadata::default());
    }

    #[test]
    fn test_year_ignores_out_of_range_numbers() {
        assert_eq!(extract("Vol. 1234, no. 2150").year, None);
    }
}
