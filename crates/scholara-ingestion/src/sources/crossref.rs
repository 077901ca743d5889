//! CrossRef DOI resolution client.
//!
//! Keyless alternative to CORE for metadata:
//! 1. Resolving bare DOIs to full metadata (title, authors, journal, year)
//! 2. Free-text search over works
//!
//! API: https://api.crossref.org/works/{doi}
//! Polite pool: set a mailto (see CrossRef etiquette)

use async_trait::async_trait;
use tracing::{debug, instrument};

use scholara_common::sandbox::SandboxClient as Client;
use scholara_common::{Paper, SearchFilters};

use super::LiteratureSource;
use crate::models::{Author, IngestionSource, PaperMetadata};

pub const CR_API_BASE: &str = "https://api.crossref.org";

pub struct CrossRefClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
}

impl CrossRefClient {
    pub fn new(client: Client) -> Self {
        Self { client, base_url: CR_API_BASE.to_string(), mailto: None }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
        self.mailto = Some(mailto.into());
        self
    }

    fn polite(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        if let Some(m) = &self.mailto {
            params.push(("mailto", m.clone()));
        }
        params
    }
}

#[async_trait]
impl LiteratureSource for CrossRefClient {
    fn name(&self) -> &'static str {
        IngestionSource::CrossRef.as_str()
    }

    #[instrument(skip(self, filters))]
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        max_results: usize,
    ) -> anyhow::Result<Vec<PaperMetadata>> {
        let mut range = Vec::new();
        if let Some(y) = filters.year_from() {
            range.push(format!("from-pub-date:{y}"));
        }
        if let Some(y) = filters.year_to() {
            range.push(format!("until-pub-date:{y}"));
        }
        let mut params = vec![
            ("query", query.trim().to_string()),
            ("rows", max_results.to_string()),
            ("select", "DOI,title,abstract,author,container-title,published,link".to_string()),
        ];
        if !range.is_empty() {
            params.push(("filter", range.join(",")));
        }

        let url = format!("{}/works", self.base_url);
        let resp = self.client.get(&url)?.query(&self.polite(params)).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("CrossRef search failed: {}", resp.status());
        }
        let body: serde_json::Value = resp.json().await?;
        let works = body["message"]["items"].as_array().cloned().unwrap_or_default();
        debug!(n = works.len(), "CrossRef search results");
        Ok(works.iter().map(work_to_paper).collect())
    }

    /// Resolve a single DOI → PaperMetadata.
    #[instrument(skip(self))]
    async fn resolve_doi(&self, doi: &str) -> anyhow::Result<Option<PaperMetadata>> {
        let url = format!("{}/works/{}", self.base_url, doi);
        let resp = self.client.get(&url)?.query(&self.polite(Vec::new())).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("CrossRef DOI lookup failed: {}", resp.status());
        }
        let body: serde_json::Value = resp.json().await?;
        Ok(Some(work_to_paper(&body["message"])))
    }

    async fn fetch_full_text(&self, _paper: &Paper) -> anyhow::Result<Option<String>> {
        // CrossRef serves metadata only.
        Ok(None)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

/// CrossRef returns JATS XML snippets in abstracts; strip the common tags.
fn strip_jats(raw: &str) -> String {
    raw.replace("<jats:p>", "")
        .replace("</jats:p>", "\n")
        .replace("<jats:italic>", "")
        .replace("</jats:italic>", "")
        .replace("<jats:bold>", "")
        .replace("</jats:bold>", "")
        .replace("<jats:title>", "")
        .replace("</jats:title>", "\n")
        .trim()
        .to_string()
}

fn work_to_paper(work: &serde_json::Value) -> PaperMetadata {
    let title = work["title"]
        .as_array()
        .and_then(|t| t.first())
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string();

    let authors: Vec<Author> = work["author"]
        .as_array()
        .map(|list| {
            list.iter()
                .map(|a| {
                    let given  = a["given"].as_str().unwrap_or("").trim();
                    let family = a["family"].as_str().unwrap_or("").trim();
                    let name = if given.is_empty() { family.to_string() } else { format!("{given} {family}") };
                    Author {
                        name,
                        affiliation: a["affiliation"]
                            .as_array()
                            .and_then(|af| af.first())
                            .and_then(|af| af["name"].as_str())
                            .map(String::from),
                        orcid: a["ORCID"].as_str().map(String::from),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let journal = work["container-title"]
        .as_array()
        .and_then(|j| j.first())
        .and_then(|j| j.as_str())
        .map(String::from);

    let year = work["published"]["date-parts"]
        .as_array()
        .and_then(|dp| dp.first())
        .and_then(|dp| dp.as_array())
        .and_then(|parts| parts.first())
        .and_then(|y| y.as_i64())
        .map(|y| y as i32);

    PaperMetadata {
        source_id: None,
        doi: work["DOI"].as_str().map(String::from),
        title,
        abstract_text: work["abstract"].as_str().map(strip_jats),
        authors,
        journal,
        year,
        source: IngestionSource::CrossRef,
        full_text_url: work["link"].as_array().and_then(|links| {
            links
                .iter()
                .find(|l| l["content-type"].as_str() == Some("application/pdf"))
                .and_then(|l| l["URL"].as_str())
                .map(String::from)
        }),
    }
}
