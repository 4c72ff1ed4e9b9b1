//! Bibliography input and request-scoped citation pairs.

use serde::{Deserialize, Serialize};

use super::pattern::ExtractedPattern;

/// One entry of the document's reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// 1-based position in the list
    pub index: usize,
    #[serde(alias = "text")]
    pub raw_text: String,
    pub start: usize,
    pub end: usize,
}

impl ReferenceEntry {
    pub fn new(index: usize, raw_text: &str) -> Self {
        Self {
            index,
            raw_text: raw_text.to_string(),
            start: 0,
            end: raw_text.len(),
        }
    }
}

/// The extracted reference section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceListExtraction {
    /// Heading as it appears in the document, e.g. `References`
    pub section_title: String,
    #[serde(default)]
    pub entries: Vec<ReferenceEntry>,
}

/// Why an inline citation was left without a reference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// No reference list, or one with no entries
    NoReferenceList,
    NoMatchingEntry,
    /// Style has no matching heuristic (Chicago author-date)
    UnsupportedStyle,
}

/// Best-effort bibliographic fields pulled out of a raw entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
}

/// An inline citation linked to zero or one reference entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationPair {
    /// Position of the inline pattern in the request
    pub pattern_index: usize,
    pub inline: ExtractedPattern,
    pub reference: Option<ReferenceEntry>,
    pub metadata: EntryMetadata,
    pub unmatched_reason: Option<UnmatchedReason>,
}

impl CitationPair {
    pub fn matched(
        pattern_index: usize,
        inline: ExtractedPattern,
        reference: ReferenceEntry,
        metadata: EntryMetadata,
    ) -> Self {
        Self {
            pattern_index,
            inline,
            reference: Some(reference),
            metadata,
            unmatched_reason: None,
        }
    }

    pub fn unmatched(pattern_index: usize, inline: ExtractedPattern, reason: UnmatchedReason) -> Self {
        Self {
            pattern_index,
            inline,
            reference: None,
            metadata: EntryMetadata::default(),
            unmatched_reason: Some(reason),
        }
    }
}
