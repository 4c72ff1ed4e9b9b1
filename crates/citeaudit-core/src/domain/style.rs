//! Citation styles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A supported citation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationStyle {
    Apa,
    Mla,
    Ieee,
    /// Chicago author-date
    Chicago,
}

impl CitationStyle {
    pub const ALL: [CitationStyle; 4] = [
        CitationStyle::Apa,
        CitationStyle::Mla,
        CitationStyle::Ieee,
        CitationStyle::Chicago,
    ];

    /// Canonical identifier, as used in requests and rule tables.
    pub fn id(&self) -> &'static str {
        match self {
            CitationStyle::Apa => "apa",
            CitationStyle::Mla => "mla",
            CitationStyle::Ieee => "ieee",
            CitationStyle::Chicago => "chicago",
        }
    }

    /// Parse an identifier, accepting common aliases. Case-insensitive.
    pub fn from_id(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "apa" | "apa7" | "apa-7" | "apa-7th" => Some(CitationStyle::Apa),
            "mla" | "mla9" | "mla-9" | "mla-9th" => Some(CitationStyle::Mla),
            "ieee" | "numeric" => Some(CitationStyle::Ieee),
            "chicago" | "chicago-author-date" | "chicago-ad" | "chicago-date" => {
                Some(CitationStyle::Chicago)
            }
            _ => None,
        }
    }

    /// Styles whose inline markers are bracketed numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, CitationStyle::Ieee)
    }
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_accepts_aliases() {
        assert_eq!(CitationStyle::from_id("APA"), Some(CitationStyle::Apa));
        assert_eq!(CitationStyle::from_id(" apa 7 "), Some(CitationStyle::Apa));
        assert_eq!(
            CitationStyle::from_id("Chicago_Author_Date"),
            Some(CitationStyle::Chicago)
        );
        assert_eq!(CitationStyle::from_id("harvard"), None);
    }

    #[test]
    fn test_id_round_trips() {
        for style in CitationStyle::ALL {
            assert_eq!(CitationStyle::from_id(style.id()), Some(style));
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&CitationStyle::Ieee).unwrap();
        assert_eq!(json, "\"ieee\"");
    }
}
