//! OpenAlex works search client

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::{http_client, RegistryConfig};
use crate::error::RegistryError;
use crate::{normalize_doi, BibliographicSearch, Result, WorkQuery, WorkRecord};

const PROVIDER: &str = "openalex";

/// OpenAlex client implementing [`BibliographicSearch`].
pub struct OpenAlexSearch {
    base_url: String,
    mailto: Option<String>,
    max_results: usize,
    http_client: reqwest::Client,
}

impl OpenAlexSearch {
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        Ok(OpenAlexSearch {
            base_url: config.openalex_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
            max_results: config.max_results.max(1),
            http_client: http_client(config)?,
        })
    }
}

#[async_trait]
impl BibliographicSearch for OpenAlexSearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &WorkQuery) -> Result<Vec<WorkRecord>> {
        let url = format!("{}/works", self.base_url);
        let per_page = self.max_results.to_string();
        let search = query.search_text();
        debug!(query = %search, "searching OpenAlex");

        let mut params = vec![("search", search.as_str()), ("per-page", per_page.as_str())];
        let year_filter;
        if let Some(year) = query.year {
            year_filter = format!("publication_year:{}-{}", year - 1, year + 1);
            params.push(("filter", year_filter.as_str()));
        }
        if let Some(mailto) = &self.mailto {
            params.push(("mailto", mailto.as_str()));
        }

        let response = self.http_client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                provider: PROVIDER.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| RegistryError::Decode {
                provider: PROVIDER.to_string(),
                detail: "missing `results` array".to_string(),
            })?;
        Ok(results.iter().filter_map(parse_work).collect())
    }
}

/// Convert one OpenAlex work object into a [`WorkRecord`].
pub fn parse_work(item: &Value) -> Option<WorkRecord> {
    let title = item
        .get("title")
        .or_else(|| item.get("display_name"))
        .and_then(Value::as_str)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())?;

    let authors = item
        .get("authorships")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|a| a.pointer("/author/display_name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(WorkRecord {
        title,
        authors,
        year: item
            .get("publication_year")
            .and_then(Value::as_i64)
            .map(|y| y as i32),
        doi: item.get("doi").and_then(Value::as_str).map(normalize_doi),
        url: item.get("id").and_then(Value::as_str).map(str::to_string),
        abstract_text: item
            .get("abstract_inverted_index")
            .and_then(rebuild_abstract),
        retracted: item
            .get("is_retracted")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        source: PROVIDER.to_string(),
    })
}

/// OpenAlex ships abstracts as `{word: [positions...]}`; put the words back in order.
fn rebuild_abstract(index: &Value) -> Option<String> {
    let map = index.as_object()?;
    let mut positioned: Vec<(u64, &str)> = Vec::new();
    for (word, positions) in map {
        for pos in positions.as_array().into_iter().flatten() {
            if let Some(p) = pos.as_u64() {
                positioned.push((p, word.as_str()));
            }
        }
    }
    if positioned.is_empty() {
        return None;
    }
    positioned.sort_by_key(|(p, _)| *p);
    Some(
        positioned
            .into_iter()
            .map(|(_, w)| w)
            .collect::<Vec<_>>()
            .join(" "),
    )
}
