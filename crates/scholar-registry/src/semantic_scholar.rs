//! Semantic Scholar paper search client

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::{http_client, RegistryConfig};
use crate::error::RegistryError;
use crate::{normalize_doi, BibliographicSearch, Result, WorkQuery, WorkRecord};

const PROVIDER: &str = "semantic_scholar";
const FIELDS: &str = "title,authors,year,abstract,externalIds,url";

/// Semantic Scholar Graph API client implementing [`BibliographicSearch`].
pub struct SemanticScholarSearch {
    base_url: String,
    api_key: Option<String>,
    max_results: usize,
    http_client: reqwest::Client,
}

impl SemanticScholarSearch {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(SemanticScholarSearch {
            base_url: config.semantic_scholar_url.trim_end_matches('/').to_string(),
            api_key: config.semantic_scholar_api_key.clone(),
            max_results: config.max_results.max(1),
            http_client: http_client(config)?,
        })
    }
}

#[async_trait]
impl BibliographicSearch for SemanticScholarSearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &WorkQuery) -> Result<Vec<WorkRecord>> {
        let url = format!("{}/graph/v1/paper/search", self.base_url);
        let limit = self.max_results.to_string();
        let text = query.search_text();
        debug!(query = %text, "searching Semantic Scholar");

        let mut params = vec![
            ("query", text.as_str()),
            ("limit", limit.as_str()),
            ("fields", FIELDS),
        ];
        let year_range;
        if let Some(year) = query.year {
            year_range = format!("{}-{}", year - 1, year + 1);
            params.push(("year", year_range.as_str()));
        }

        let mut request = self.http_client.get(&url).query(&params);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                provider: PROVIDER.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        // An empty result set omits `data` entirely
        let Some(data) = body.get("data") else {
            return Ok(Vec::new());
        };
        let items = data.as_array().ok_or_else(|| RegistryError::Decode {
            provider: PROVIDER.to_string(),
            detail: "`data` is not an array".to_string(),
        })?;
        Ok(items.iter().filter_map(parse_paper).collect())
    }
}

/// Convert one Semantic Scholar paper object into a [`WorkRecord`].
pub fn parse_paper(item: &Value) -> Option<WorkRecord> {
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())?;

    Some(WorkRecord {
        title,
        authors: item
            .get("authors")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|a| a.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        year: item.get("year").and_then(Value::as_i64).map(|y| y as i32),
        doi: item
            .pointer("/externalIds/DOI")
            .and_then(Value::as_str)
            .map(normalize_doi),
        url: item.get("url").and_then(Value::as_str).map(str::to_string),
        abstract_text: item
            .get("abstract")
            .and_then(Value::as_str)
            .map(str::to_string)
            .filter(|a| !a.trim().is_empty()),
        retracted: false,
        source: PROVIDER.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_paper() {
        let item = json!({
            "paperId": "abc",
            "title": "BERT: Pre-training of Deep Bidirectional Transformers",
            "year": 2019,
            "abstract": "We introduce a new language representation model.",
            "externalIds": {"DOI": "10.18653/V1/N19-1423"},
            "url": "https://www.semanticscholar.org/paper/abc",
            "authors": [{"name": "Jacob Devlin"}]
        });

        let work = parse_paper(&item).unwrap();
        assert_eq!(work.year, Some(2019));
        assert_eq!(work.doi.as_deref(), Some("10.18653/v1/n19-1423"));
        assert_eq!(work.authors, vec!["Jacob Devlin"]);
        assert!(work.abstract_text.is_some());
        assert_eq!(work.source, "semantic_scholar");
    }

    #[test]
    fn test_parse_paper_blank_abstract_is_none() {
        let item = json!({"title": "Untitled draft", "abstract": "   "});
        assert!(parse_paper(&item).unwrap().abstract_text.is_none());
    }
}
