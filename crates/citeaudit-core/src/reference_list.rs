//! Structural checks on the extracted reference section.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::domain::{CitationFlag, CitationStyle, ReferenceListExtraction, Severity, ViolationType};
use crate::rules::{NumberingPolicy, StyleRuleRegistry};

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\[\d+\]|\d+\.)").expect("leading number regex"));

/// True when a reference entry starts with `[n]` or `n.`.
pub fn has_leading_number(raw: &str) -> bool {
    LEADING_NUMBER.is_match(raw)
}

fn normalize_title(title: &str) -> String {
    title.trim().trim_end_matches(':').trim_end().to_lowercase()
}

/// Validates the reference section title and numbering convention.
#[derive(Debug, Clone)]
pub struct ReferenceListValidator {
    registry: Arc<StyleRuleRegistry>,
}

impl ReferenceListValidator {
    pub fn new(registry: Arc<StyleRuleRegistry>) -> Self {
        Self { registry }
    }

    /// Flags for `list` under `style`. A missing list yields nothing here.
    pub fn validate(&self, list: Option<&ReferenceListExtraction>, style: CitationStyle) -> Vec<CitationFlag> {
        let Some(list) = list else {
            return Vec::new();
        };
        let rules = self.registry.rules_for(style);
        let mut flags = Vec::new();

        let title = normalize_title(&list.section_title);
        let accepted = rules
            .reference_titles
            .iter()
            .any(|t| normalize_title(t) == title);
        if !accepted {
            flags.push(
                CitationFlag::new(
                    ViolationType::ReferenceSectionTitle,
                    &format!("{style}.reference.title"),
                    &rules.messages.reference_title,
                    Severity::Error,
                )
                // The extraction carries no heading offsets; the heading is the section.
                .with_section(Some(&list.section_title))
                .with_expected(rules.canonical_title()),
            );
        }

        // Only the first entry is probed; mixed numbering further down goes unnoticed.
        if let Some(first) = list.entries.first() {
            let numbered = has_leading_number(&first.raw_text);
            let mismatch = match rules.numbering {
                NumberingPolicy::Required => !numbered,
                NumberingPolicy::Forbidden => numbered,
            };
            if mismatch {
                let expected = match rules.numbering {
                    NumberingPolicy::Required => "numbered",
                    NumberingPolicy::Forbidden => "unnumbered",
                };
                flags.push(
                    CitationFlag::new(
                        ViolationType::ReferenceNumbering,
                        &format!("{style}.reference.numbering"),
                        &rules.messages.numbering,
                        Severity::Warning,
                    )
                    .with_anchor(&first.raw_text, first.start, first.end)
                    .with_expected(expected),
                );
            }
        }

        flags
    }
}
