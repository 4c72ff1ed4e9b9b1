//! Audit request and report envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuditError, Result};
use super::flag::CitationFlag;
use super::integrity::IntegrityIndex;
use super::pattern::ExtractedPattern;
use super::reference::ReferenceListExtraction;
use super::style::CitationStyle;
use super::verification::VerificationResult;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub title: String,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub word_count: Option<usize>,
}

/// Everything the upstream extractor hands to the audit pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    /// Declared style identifier; unknown identifiers fall back to the default style
    pub style: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub sections: Vec<DocumentSection>,
    pub inline_patterns: Vec<ExtractedPattern>,
    /// `None` when the extractor found no reference section
    #[serde(default)]
    pub reference_list: Option<ReferenceListExtraction>,
    #[serde(default)]
    pub word_count: Option<usize>,
}

impl AuditRequest {
    pub fn new(style: &str, inline_patterns: Vec<ExtractedPattern>) -> Self {
        Self {
            style: style.to_string(),
            metadata: DocumentMetadata::default(),
            sections: Vec::new(),
            inline_patterns,
            reference_list: None,
            word_count: None,
        }
    }

    pub fn with_reference_list(mut self, list: ReferenceListExtraction) -> Self {
        self.reference_list = Some(list);
        self
    }

    pub fn with_word_count(mut self, words: usize) -> Self {
        self.word_count = Some(words);
        self
    }

    /// Reject structurally broken input before any stage runs.
    pub fn validate(&self) -> Result<()> {
        if self.style.trim().is_empty() {
            return Err(AuditError::InvalidRequest("style must not be empty".to_string()));
        }
        for (i, p) in self.inline_patterns.iter().enumerate() {
            if p.text.trim().is_empty() {
                return Err(AuditError::InvalidRequest(format!(
                    "inline pattern {i} has empty text"
                )));
            }
            if p.end < p.start {
                return Err(AuditError::InvalidRequest(format!(
                    "inline pattern {i} ends ({}) before it starts ({})",
                    p.end, p.start
                )));
            }
        }
        if let Some(list) = &self.reference_list {
            for entry in &list.entries {
                if entry.end < entry.start {
                    return Err(AuditError::InvalidRequest(format!(
                        "reference entry {} ends ({}) before it starts ({})",
                        entry.index, entry.end, entry.start
                    )));
                }
            }
        }
        Ok(())
    }

    /// Declared word count, else the sum of per-section counts.
    pub fn effective_word_count(&self) -> usize {
        self.word_count
            .unwrap_or_else(|| self.sections.iter().filter_map(|s| s.word_count).sum())
    }
}

/// Complete audit outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub audit_id: Uuid,
    /// Style the audit actually ran under
    pub style: CitationStyle,
    /// Style identifier exactly as requested
    pub requested_style: String,
    pub generated_at: DateTime<Utc>,
    pub flags: Vec<CitationFlag>,
    pub verification_results: Vec<VerificationResult>,
    /// Advisory fingerprint of the styles actually used
    pub detected_styles: Vec<CitationStyle>,
    pub integrity_index: IntegrityIndex,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatternType, ReferenceEntry};

    #[test]
    fn test_validate_rejects_inverted_offsets() {
        let req = AuditRequest::new(
            "apa",
            vec![ExtractedPattern::new(PatternType::AuthorYear, "(Smith, 2020)", 20, 10)],
        );
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("inline pattern 0"));
    }

    #[test]
    fn test_validate_rejects_blank_style_and_text() {
        assert!(AuditRequest::new("  ", vec![]).validate().is_err());
        let req = AuditRequest::new(
            "apa",
            vec![ExtractedPattern::new(PatternType::AuthorYear, " ", 0, 1)],
        );
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_reference_entry() {
        let mut entry = ReferenceEntry::new(1, "Smith, J. (2020). Title.");
        entry.start = 50;
        entry.end = 10;
        let req = AuditRequest::new("apa", vec![]).with_reference_list(ReferenceListExtraction {
            section_title: "References".to_string(),
            entries: vec![entry],
        });
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_effective_word_count_falls_back_to_sections() {
        let mut req = AuditRequest::new("apa", vec![]);
        req.sections = vec![
            DocumentSection {
                title: "Intro".to_string(),
                start: 0,
                end: 100,
                word_count: Some(300),
            },
            DocumentSection {
                title: "Body".to_string(),
                start: 100,
                end: 900,
                word_count: Some(700),
            },
        ];
        assert_eq!(req.effective_word_count(), 1000);
        assert_eq!(req.with_word_count(42).effective_word_count(), 42);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{
            "style": "ieee",
            "inline_patterns": [
                {"pattern_type": "numeric_bracket", "text": "[1]", "start": 4, "end": 7}
            ],
            "reference_list": null
        }"#;
        let req: AuditRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.inline_patterns.len(), 1);
        assert!(req.reference_list.is_none());
        assert!(req.validate().is_ok());
    }
}
