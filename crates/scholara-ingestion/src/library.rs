//! Research library: turns literature-source records into store papers.
//!
//! The library holds no papers of its own; the entity store is the single
//! collection. It resolves DOIs, enriches papers with full text, runs remote
//! searches and ranks a local paper list against a query.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use scholara_common::{IdGenerator, Paper, SearchFilters};

use crate::dedup::{check_duplicate, normalise_doi};
use crate::sources::LiteratureSource;

#[derive(Debug, Clone)]
pub struct LibraryOptions {
    pub max_results: usize,
    pub fetch_full_text: bool,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self { max_results: 10, fetch_full_text: true }
    }
}

pub struct ResearchLibrary {
    source: Arc<dyn LiteratureSource>,
    ids: Arc<IdGenerator>,
    options: LibraryOptions,
}

impl ResearchLibrary {
    pub fn new(source: Arc<dyn LiteratureSource>, ids: Arc<IdGenerator>, options: LibraryOptions) -> Self {
        Self { source, ids, options }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Attach full text when the source has it. A failed fetch is logged and
    /// the paper is returned unchanged.
    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    pub async fn enrich(&self, mut paper: Paper) -> Paper {
        if !self.options.fetch_full_text || paper.full_text.is_some() {
            return paper;
        }
        match self.source.fetch_full_text(&paper).await {
            Ok(Some(text)) => {
                debug!(chars = text.len(), "Full text attached");
                paper.full_text = Some(text);
            }
            Ok(None) => debug!("No full text available"),
            Err(e) => warn!(source = self.source.name(), error = %e, "Full-text fetch failed; continuing without it"),
        }
        paper
    }

    /// Resolve a DOI to an enriched paper. `Ok(None)` when the source has
    /// no record of it.
    #[instrument(skip(self))]
    pub async fn import_doi(&self, doi: &str) -> anyhow::Result<Option<Paper>> {
        let doi = normalise_doi(doi);
        if doi.is_empty() {
            return Ok(None);
        }
        let Some(meta) = self.source.resolve_doi(&doi).await? else {
            info!(%doi, source = self.source.name(), "DOI not found");
            return Ok(None);
        };
        let paper = meta.into_paper(|| self.ids.next_id(), Utc::now());
        Ok(Some(self.enrich(paper).await))
    }

    /// Remote search. Filters the source cannot apply are applied here, and
    /// duplicates within the result set are dropped.
    #[instrument(skip(self, filters))]
    pub async fn search(&self, query: &str, filters: &SearchFilters) -> anyhow::Result<Vec<Paper>> {
        let found = self.source.search(query, filters, self.options.max_results).await?;
        let now = Utc::now();

        let mut papers: Vec<Paper> = Vec::with_capacity(found.len());
        for meta in found {
            let paper = meta.into_paper(|| self.ids.next_id(), now);
            if !filters.matches(&paper) {
                continue;
            }
            if check_duplicate(&paper, &papers).is_new() {
                papers.push(paper);
            }
        }
        info!(query, n = papers.len(), source = self.source.name(), "Literature search finished");
        Ok(papers)
    }
}

/// Rank papers against a whitespace-separated query: each term scores 2 when
/// it occurs in the title and 1 when it occurs in the abstract. Papers with a
/// zero score are dropped; ties keep their original order.
pub fn search_local<'a>(papers: &'a [Paper], query: &str) -> Vec<&'a Paper> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(u32, &Paper)> = papers
        .iter()
        .map(|p| {
            let title = p.title.to_lowercase();
            let abstract_text = p.abstract_text.as_deref().unwrap_or("").to_lowercase();
            let score: u32 = terms
                .iter()
                .map(|t| {
                    (if title.contains(t.as_str()) { 2 } else { 0 })
                        + (if abstract_text.contains(t.as_str()) { 1 } else { 0 })
                })
                .sum();
            (score, p)
        })
        .filter(|(score, _)| *score > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholara_common::seed;

    #[test]
    fn test_local_search_ranks_title_over_abstract() {
        let papers = seed::papers();
        let hits = search_local(&papers, "crispr");
        assert_eq!(hits[0].id, "demo");

        let none = search_local(&papers, "zebrafish");
        assert!(none.is_empty());
        assert!(search_local(&papers, "   ").is_empty());
    }

    #[test]
    fn test_local_search_sums_terms() {
        let papers = seed::papers();
        let hits = search_local(&papers, "climate marine");
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.id != "demo"));
    }
}
