//! CORE API v3 client (open-access aggregator).
//!
//! Search:    GET {base}/search/works?q=…&limit=…&offset=0
//! DOI:       GET {base}/search/works?q=doi:"…"&limit=1
//! Full text: GET {base}/works/{id}, then the record's `fullText` or its
//!            `downloadUrl`.
//!
//! Every request carries the API key as a bearer token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument};

use scholara_common::sandbox::SandboxClient as Client;
use scholara_common::{Paper, SearchFilters};

use super::LiteratureSource;
use crate::models::{Author, IngestionSource, PaperMetadata};

pub const CORE_API_BASE: &str = "https://api.core.ac.uk/v3";

pub struct CoreClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl CoreClient {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key, base_url: CORE_API_BASE.to_string() }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> anyhow::Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)?
            .bearer_auth(self.api_key.expose_secret())
            .query(params)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("CORE API request failed: {}", resp.status());
        }
        Ok(Some(resp.json().await?))
    }

    async fn work_record(&self, paper: &Paper) -> anyhow::Result<Option<Value>> {
        if let Some(doi) = &paper.doi {
            let hit = self
                .call("/search/works", &[("q", format!("doi:\"{doi}\"")), ("limit", "1".into())])
                .await?
                .and_then(|body| body["results"].as_array().and_then(|r| r.first().cloned()));
            if hit.is_some() {
                return Ok(hit);
            }
        }
        self.call(&format!("/works/{}", paper.id), &[]).await
    }
}

#[async_trait]
impl LiteratureSource for CoreClient {
    fn name(&self) -> &'static str {
        IngestionSource::Core.as_str()
    }

    #[instrument(skip(self, filters))]
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        max_results: usize,
    ) -> anyhow::Result<Vec<PaperMetadata>> {
        let mut params = vec![
            ("q", query.trim().to_string()),
            ("limit", max_results.to_string()),
            ("offset", "0".to_string()),
        ];
        if let Some(y) = filters.year_from() {
            params.push(("year_min", y.to_string()));
        }
        if let Some(y) = filters.year_to() {
            params.push(("year_max", y.to_string()));
        }

        let body = self.call("/search/works", &params).await?.unwrap_or_default();
        let results: Vec<PaperMetadata> = body["results"]
            .as_array()
            .map(|works| works.iter().map(work_to_paper).collect())
            .unwrap_or_default();
        debug!(n = results.len(), total = body["totalHits"].as_u64(), "CORE search results");
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn resolve_doi(&self, doi: &str) -> anyhow::Result<Option<PaperMetadata>> {
        let body = self
            .call("/search/works", &[("q", format!("doi:\"{doi}\"")), ("limit", "1".into())])
            .await?;
        Ok(body
            .as_ref()
            .and_then(|b| b["results"].as_array())
            .and_then(|r| r.first())
            .map(work_to_paper))
    }

    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    async fn fetch_full_text(&self, paper: &Paper) -> anyhow::Result<Option<String>> {
        let Some(work) = self.work_record(paper).await? else {
            return Ok(None);
        };
        if let Some(text) = work["fullText"].as_str().filter(|t| !t.trim().is_empty()) {
            return Ok(Some(text.to_string()));
        }
        let Some(url) = work["downloadUrl"].as_str().filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        debug!(url, "Downloading CORE full text");
        let resp = self.client.get(url)?.send().await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let text = resp.text().await?;
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

fn work_to_paper(work: &Value) -> PaperMetadata {
    // CORE ids are integers in v3 and strings in older dumps.
    let source_id = match &work["id"] {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };

    let authors = work["authors"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| a["name"].as_str().or_else(|| a.as_str()))
                .map(Author::named)
                .collect()
        })
        .unwrap_or_default();

    let journal = work["journal"]
        .as_str()
        .or_else(|| {
            work["journals"]
                .as_array()
                .and_then(|j| j.first())
                .and_then(|j| j["title"].as_str())
        })
        .map(String::from);

    let year = work["yearPublished"]
        .as_i64()
        .or_else(|| work["year"].as_i64())
        .map(|y| y as i32);

    PaperMetadata {
        source_id,
        doi: work["doi"].as_str().map(String::from),
        title: work["title"].as_str().unwrap_or("").trim().to_string(),
        abstract_text: work["abstract"].as_str().map(|a| a.trim().to_string()),
        authors,
        journal,
        year,
        source: IngestionSource::Core,
        full_text_url: work["downloadUrl"].as_str().map(String::from),
    }
}
