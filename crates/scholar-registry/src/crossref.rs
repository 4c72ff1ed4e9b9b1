//! Crossref DOI registry client
//!
//! Resolves DOIs through the Crossref REST API (`GET /works/{doi}`).
//! A 404 is a definite "unknown identifier", not an error.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::config::{http_client, RegistryConfig};
use crate::error::RegistryError;
use crate::{normalize_doi, IdentifierRegistry, Result, WorkRecord};

const PROVIDER: &str = "crossref";

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup regex"));

/// Crossref client implementing [`IdentifierRegistry`].
pub struct CrossrefRegistry {
    base_url: String,
    mailto: Option<String>,
    http_client: reqwest::Client,
}

impl CrossrefRegistry {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(CrossrefRegistry {
            base_url: config.crossref_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            http_client: http_client(config)?,
        })
    }

    /// `{base_url}/works/{doi}` with the DOI as one escaped path segment.
    pub fn work_url(&self, doi: &str) -> Result<Url> {
        let invalid = || RegistryError::Http(format!("invalid Crossref base URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("works")
            .push(doi);
        Ok(url)
    }
}

#[async_trait]
impl IdentifierRegistry for CrossrefRegistry {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn resolve(&self, doi: &str) -> Result<Option<WorkRecord>> {
        let doi = normalize_doi(doi);
        let url = self.work_url(&doi)?;
        debug!(doi = %doi, "resolving DOI via Crossref");

        let mut request = self.http_client.get(url);
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }
        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                provider: PROVIDER.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let message = body.get("message").ok_or_else(|| RegistryError::Decode {
            provider: PROVIDER.to_string(),
            detail: "missing `message` object".to_string(),
        })?;
        Ok(parse_work(message))
    }
}

/// Convert a Crossref `message` object into a [`WorkRecord`].
///
/// Returns `None` when the record has no title.
pub fn parse_work(message: &Value) -> Option<WorkRecord> {
    let title = message
        .get("title")
        .and_then(|t| match t {
            Value::Array(items) => items.first().and_then(Value::as_str),
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let authors = message
        .get("author")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|a| {
                    let family = a.get("family").and_then(Value::as_str);
                    let given = a.get("given").and_then(Value::as_str);
                    match (given, family) {
                        (Some(g), Some(f)) => Some(format!("{g} {f}")),
                        (None, Some(f)) => Some(f.to_string()),
                        _ => a.get("name").and_then(Value::as_str).map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let year = ["issued", "published", "published-print", "published-online"]
        .iter()
        .find_map(|key| {
            message
                .get(*key)
                .and_then(|d| d.pointer("/date-parts/0/0"))
                .and_then(Value::as_i64)
        })
        .map(|y| y as i32);

    let abstract_text = message
        .get("abstract")
        .and_then(Value::as_str)
        .map(|a| MARKUP.replace_all(a, " ").split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|a| !a.is_empty());

    let retracted_by_update = message
        .get("updated-by")
        .and_then(Value::as_array)
        .map(|updates| {
            updates.iter().any(|u| {
                u.get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.eq_ignore_ascii_case("retraction"))
            })
        })
        .unwrap_or(false);
    let retracted = retracted_by_update || title.to_ascii_uppercase().starts_with("RETRACTED");

    Some(WorkRecord {
        title,
        authors,
        year,
        doi: message.get("DOI").and_then(Value::as_str).map(normalize_doi),
        url: message.get("URL").and_then(Value::as_str).map(str::to_string),
        abstract_text,
        retracted,
        source: PROVIDER.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_work_url_escapes_doi_delimiters() {
        let registry = CrossrefRegistry::new(&RegistryConfig::default()).unwrap();
        let url = registry.work_url("10.1000/a#b?c").unwrap();
        assert!(url.path().ends_with("/works/10.1000%2Fa%23b%3Fc"));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_parse_work_extracts_core_fields() {
        let message = json!({
            "DOI": "10.1038/NATURE14539",
            "URL": "https://doi.org/10.1038/nature14539",
            "title": ["Deep learning"],
            "author": [
                {"given": "Yann", "family": "LeCun"},
                {"family": "Bengio"}
            ],
            "issued": {"date-parts": [[2015, 5, 27]]},
            "abstract": "<jats:p>Deep learning allows  computational models</jats:p>"
        });

        let work = parse_work(&message).unwrap();
        assert_eq!(work.title, "Deep learning");
        assert_eq!(work.authors, vec!["Yann LeCun", "Bengio"]);
        assert_eq!(work.year, Some(2015));
        assert_eq!(work.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(
            work.abstract_text.as_deref(),
            Some("Deep learning allows computational models")
        );
        assert!(!work.retracted);
        assert_eq!(work.source, "crossref");
    }

    #[test]
    fn test_parse_work_detects_retraction() {
        let message = json!({
            "title": ["Some withdrawn result"],
            "updated-by": [{"type": "retraction", "DOI": "10.1/retraction"}]
        });
        assert!(parse_work(&message).unwrap().retracted);

        let message = json!({"title": ["RETRACTED: Some withdrawn result"]});
        assert!(parse_work(&message).unwrap().retracted);
    }

    #[test]
    fn test_parse_work_without_title_is_none() {
        assert!(parse_work(&json!({"title": []})).is_none());
        assert!(parse_work(&json!({"DOI": "10.1/x"})).is_none());
    }

    #[test]
    fn test_registry_strips_trailing_slash() {
        let config = RegistryConfig {
            crossref_url: "https://api.crossref.org/".to_string(),
            ..RegistryConfig::default()
        };
        let registry = CrossrefRegistry::new(&config).unwrap();
        assert_eq!(registry.base_url, "https://api.crossref.org");
        assert_eq!(registry.name(), "crossref");
    }
}
