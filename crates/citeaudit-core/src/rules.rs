//! Style rule registry.
//!
//! One immutable [`StyleRuleConfig`] per [`CitationStyle`], built once at
//! startup (built-in table or a TOML file) and shared behind an `Arc`.
//! Every user-facing message the observer and validator emit comes from
//! here.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{AuditError, CitationStyle, PatternType, Result};

/// Whether reference entries carry a leading `[n]` / `n.` number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingPolicy {
    Required,
    Forbidden,
}

/// Message table for one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleMessages {
    /// One message per disallowed inline pattern
    pub inline: BTreeMap<PatternType, String>,
    pub reference_title: String,
    pub numbering: String,
}

/// Rules for one citation style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRuleConfig {
    pub style: CitationStyle,
    pub display_name: String,
    pub allowed: BTreeSet<PatternType>,
    pub disallowed: BTreeSet<PatternType>,
    /// Accepted reference-section headings; the first one is canonical
    pub reference_titles: Vec<String>,
    pub numbering: NumberingPolicy,
    pub messages: StyleMessages,
}

impl StyleRuleConfig {
    pub fn is_disallowed(&self, pattern: PatternType) -> bool {
        self.disallowed.contains(&pattern)
    }

    /// Message for an inline violation of `pattern`.
    pub fn inline_message(&self, pattern: PatternType) -> &str {
        self.messages
            .inline
            .get(&pattern)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn canonical_title(&self) -> &str {
        self.reference_titles
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Messages that do not depend on the declared style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMessages {
    pub mixed_styles: String,
}

/// On-disk layout of a rule table. Table keys are plain strings so style
/// aliases and pattern ids are resolved the same way as in requests.
#[derive(Debug, Deserialize)]
struct RuleFile {
    default_style: String,
    global: GlobalMessages,
    styles: BTreeMap<String, StyleRuleFile>,
}

#[derive(Debug, Deserialize)]
struct StyleRuleFile {
    display_name: String,
    allowed: BTreeSet<PatternType>,
    disallowed: BTreeSet<PatternType>,
    reference_titles: Vec<String>,
    numbering: NumberingPolicy,
    messages: MessagesFile,
}

#[derive(Debug, Deserialize)]
struct MessagesFile {
    #[serde(default)]
    inline: BTreeMap<String, String>,
    reference_title: String,
    numbering: String,
}

impl StyleRuleFile {
    fn into_config(self, style: CitationStyle) -> Result<StyleRuleConfig> {
        let mut inline = BTreeMap::new();
        for (key, message) in self.messages.inline {
            let pattern = PatternType::from_id(&key).ok_or_else(|| {
                AuditError::Config(format!("style `{style}` has a message for unknown pattern `{key}`"))
            })?;
            inline.insert(pattern, message);
        }
        Ok(StyleRuleConfig {
            style,
            display_name: self.display_name,
            allowed: self.allowed,
            disallowed: self.disallowed,
            reference_titles: self.reference_titles,
            numbering: self.numbering,
            messages: StyleMessages {
                inline,
                reference_title: self.messages.reference_title,
                numbering: self.messages.numbering,
            },
        })
    }
}

/// Immutable, process-wide style rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRuleRegistry {
    default_style: CitationStyle,
    global: GlobalMessages,
    /// Indexed by `CitationStyle as usize`; always holds every style
    styles: Vec<StyleRuleConfig>,
}

impl StyleRuleRegistry {
    /// The built-in rule table.
    pub fn builtin() -> Self {
        Self {
            default_style: CitationStyle::Apa,
            global: GlobalMessages {
                mixed_styles: "The document mixes numeric [n] citations with author-date citations; \
                               use a single citation system throughout."
                    .to_string(),
            },
            styles: CitationStyle::ALL.iter().map(|s| builtin_rules(*s)).collect(),
        }
    }

    /// Parse and validate a TOML rule table.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(text)?;
        let default_style = CitationStyle::from_id(&file.default_style).ok_or_else(|| {
            AuditError::Config(format!("unknown default_style `{}`", file.default_style))
        })?;

        let mut by_style = BTreeMap::new();
        for (key, spec) in file.styles {
            let style = CitationStyle::from_id(&key)
                .ok_or_else(|| AuditError::Config(format!("unknown style `{key}` in rule table")))?;
            by_style.insert(style, spec);
        }

        let mut styles = Vec::with_capacity(CitationStyle::ALL.len());
        for style in CitationStyle::ALL {
            let spec = by_style.remove(&style).ok_or_else(|| {
                AuditError::Config(format!("rule table has no entry for style `{style}`"))
            })?;
            let config = spec.into_config(style)?;
            validate_rules(&config)?;
            styles.push(config);
        }
        if file.global.mixed_styles.trim().is_empty() {
            return Err(AuditError::Config("global.mixed_styles message is empty".to_string()));
        }
        Ok(Self {
            default_style,
            global: file.global,
            styles,
        })
    }

    /// Load a TOML rule table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn default_style(&self) -> CitationStyle {
        self.default_style
    }

    pub fn global_messages(&self) -> &GlobalMessages {
        &self.global
    }

    /// Resolve a style identifier, falling back to the default style.
    pub fn resolve_style(&self, id: &str) -> CitationStyle {
        match CitationStyle::from_id(id) {
            Some(style) => style,
            None => {
                warn!(requested = %id, fallback = %self.default_style, "unrecognized citation style, using default");
                self.default_style
            }
        }
    }

    /// Rules for a style identifier; unknown identifiers get the default style's rules.
    pub fn get_rules(&self, id: &str) -> &StyleRuleConfig {
        self.rules_for(self.resolve_style(id))
    }

    pub fn rules_for(&self, style: CitationStyle) -> &StyleRuleConfig {
        &self.styles[style as usize]
    }

    pub fn styles(&self) -> impl Iterator<Item = &StyleRuleConfig> {
        self.styles.iter()
    }
}

impl Default for StyleRuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_rules(config: &StyleRuleConfig) -> Result<()> {
    let style = config.style;
    if let Some(p) = config.allowed.intersection(&config.disallowed).next() {
        return Err(AuditError::Config(format!(
            "style `{style}` both allows and disallows `{p}`"
        )));
    }
    if config.reference_titles.iter().all(|t| t.trim().is_empty()) {
        return Err(AuditError::Config(format!(
            "style `{style}` declares no reference section title"
        )));
    }
    if let Some(p) = config
        .disallowed
        .iter()
        .find(|p| config.messages.inline.get(p).map_or(true, |m| m.trim().is_empty()))
    {
        return Err(AuditError::Config(format!(
            "style `{style}` has no message for disallowed pattern `{p}`"
        )));
    }
    Ok(())
}

fn builtin_rules(style: CitationStyle) -> StyleRuleConfig {
    use PatternType::*;

    let (display_name, allowed, disallowed, titles, numbering) = match style {
        CitationStyle::Apa => (
            "APA (7th edition)",
            vec![AuthorYear, EtAl, AmpersandInParens],
            vec![NumericBracket, AuthorPage, AndInParens, EtAlMalformed],
            vec!["References"],
            NumberingPolicy::Forbidden,
        ),
        CitationStyle::Mla => (
            "MLA (9th edition)",
            vec![AuthorPage, EtAl, AndInParens],
            vec![NumericBracket, AuthorYear, AmpersandInParens, EtAlMalformed],
            vec!["Works Cited"],
            NumberingPolicy::Forbidden,
        ),
        CitationStyle::Ieee => (
            "IEEE",
            vec![NumericBracket, EtAl],
            vec![AuthorYear, AuthorPage, AmpersandInParens, AndInParens, EtAlMalformed],
            vec!["References"],
            NumberingPolicy::Required,
        ),
        CitationStyle::Chicago => (
            "Chicago (author-date)",
            vec![AuthorYear, EtAl, AndInParens],
            vec![NumericBracket, AuthorPage, AmpersandInParens, EtAlMalformed],
            vec!["References", "Reference List"],
            NumberingPolicy::Forbidden,
        ),
    };

    let inline = disallowed
        .iter()
        .map(|p| (*p, inline_message(display_name, *p)))
        .collect();

    let numbering_message = match numbering {
        NumberingPolicy::Required => format!(
            "{display_name} reference entries must be numbered in citation order, e.g. [1]."
        ),
        NumberingPolicy::Forbidden => format!(
            "{display_name} reference entries are ordered alphabetically and must not be numbered."
        ),
    };

    StyleRuleConfig {
        style,
        display_name: display_name.to_string(),
        allowed: allowed.into_iter().collect(),
        disallowed: disallowed.into_iter().collect(),
        reference_titles: titles.iter().map(|t| t.to_string()).collect(),
        numbering,
        messages: StyleMessages {
            inline,
            reference_title: format!(
                "{display_name} expects the reference section to be titled \"{}\".",
                titles[0]
            ),
            numbering: numbering_message,
        },
    }
}

fn inline_message(display_name: &str, pattern: PatternType) -> String {
    let what = match pattern {
        PatternType::NumericBracket => "Numeric bracket citations such as [1] are not used",
        PatternType::AuthorYear => "Author-year citations such as (Smith, 2020) are not used",
        PatternType::AuthorPage => "Author-page citations such as (Smith 42) are not used",
        PatternType::EtAl => "\"et al.\" citations are not used",
        PatternType::EtAlMalformed => "\"et al.\" is misspelled; write \"et al.\" with a single period",
        PatternType::AmpersandInParens => {
            "An ampersand inside parenthetical citations is not used; write \"and\""
        }
        PatternType::AndInParens => {
            "\"and\" inside parenthetical citations is not used; write \"&\""
        }
        PatternType::MixedStyle => "Mixed citation systems are not allowed",
    };
    format!("{what} in {display_name}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_style() {
        let registry = StyleRuleRegistry::builtin();
        for style in CitationStyle::ALL {
            let rules = registry.rules_for(style);
            assert_eq!(rules.style, style);
            assert!(validate_rules(rules).is_ok());
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_default() {
        let registry = StyleRuleRegistry::builtin();
        assert_eq!(registry.resolve_style("harvard"), CitationStyle::Apa);
        assert_eq!(registry.get_rules("harvard").style, CitationStyle::Apa);
        assert_eq!(registry.get_rules("IEEE").style, CitationStyle::Ieee);
    }

    #[test]
    fn test_ieee_requires_numbering_and_forbids_author_year() {
        let rules = StyleRuleRegistry::builtin().rules_for(CitationStyle::Ieee).clone();
        assert_eq!(rules.numbering, NumberingPolicy::Required);
        assert!(rules.is_disallowed(PatternType::AuthorYear));
        assert!(!rules.is_disallowed(PatternType::NumericBracket));
        assert!(rules.inline_message(PatternType::AuthorYear).contains("IEEE"));
    }

    #[test]
    fn test_every_disallowed_pattern_has_a_message() {
        let registry = StyleRuleRegistry::builtin();
        for rules in registry.styles() {
            for p in &rules.disallowed {
                assert!(!rules.inline_message(*p).is_empty(), "{} {}", rules.style, p);
            }
        }
    }

    fn toml_table(apa_allowed: &str) -> String {
        let mut text = String::from(
            "default_style = \"mla\"\n[global]\nmixed_styles = \"mixed\"\n",
        );
        for style in ["apa", "mla", "ieee", "chicago"] {
            let allowed = if style == "apa" { apa_allowed } else { "[\"et_al\"]" };
            text.push_str(&format!(
                "[styles.{style}]\ndisplay_name = \"{style}\"\nallowed = {allowed}\n\
                 disallowed = [\"numeric_bracket\"]\nreference_titles = [\"References\"]\n\
                 numbering = \"forbidden\"\n[styles.{style}.messages]\n\
                 reference_title = \"title\"\nnumbering = \"numbering\"\n\
                 [styles.{style}.messages.inline]\nnumeric_bracket = \"no numbers\"\n"
            ));
        }
        text
    }

    #[test]
    fn test_from_toml_loads_custom_table() {
        let registry = StyleRuleRegistry::from_toml_str(&toml_table("[\"author_year\"]")).unwrap();
        assert_eq!(registry.default_style(), CitationStyle::Mla);
        let ieee = registry.rules_for(CitationStyle::Ieee);
        assert_eq!(ieee.style, CitationStyle::Ieee);
        assert_eq!(ieee.inline_message(PatternType::NumericBracket), "no numbers");
        assert_eq!(registry.global_messages().mixed_styles, "mixed");
    }

    #[test]
    fn test_from_toml_rejects_overlapping_sets() {
        let err = StyleRuleRegistry::from_toml_str(&toml_table("[\"numeric_bracket\"]")).unwrap_err();
        assert!(err.to_string().contains("both allows and disallows"));
    }

    #[test]
    fn test_from_toml_rejects_missing_style() {
        let text = "default_style = \"apa\"\n[global]\nmixed_styles = \"m\"\n[styles]\n";
        assert!(StyleRuleRegistry::from_toml_str(text).is_err());
    }
}
