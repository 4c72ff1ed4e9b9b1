//! Compliance flags emitted by the observer and the reference-list validator.

use serde::{Deserialize, Serialize};

/// Category of a compliance violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// Inline marker shape not allowed by the declared style
    InlineStyle,
    /// Numeric and author-year markers in the same document
    MixedStyles,
    ReferenceSectionTitle,
    ReferenceNumbering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Location of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A single compliance finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationFlag {
    pub violation_type: ViolationType,
    /// Stable rule identifier, e.g. `ieee.inline.author_year`
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<TextAnchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// What the style expected instead, when there is a single answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl CitationFlag {
    pub fn new(violation_type: ViolationType, rule_id: &str, message: &str, severity: Severity) -> Self {
        Self {
            violation_type,
            rule_id: rule_id.to_string(),
            message: message.to_string(),
            severity,
            anchor: None,
            section: None,
            expected: None,
        }
    }

    pub fn with_anchor(mut self, text: &str, start: usize, end: usize) -> Self {
        self.anchor = Some(TextAnchor {
            text: text.to_string(),
            start,
            end,
        });
        self
    }

    pub fn with_section(mut self, section: Option<&str>) -> Self {
        self.section = section.map(str::to_string);
        self
    }

    pub fn with_expected(mut self, expected: &str) -> Self {
        self.expected = Some(expected.to_string());
        self
    }
}
