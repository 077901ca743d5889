//! Literature source clients.

pub mod core;
pub mod crossref;

use async_trait::async_trait;

use scholara_common::{Paper, SearchFilters};

use crate::models::PaperMetadata;

/// Common interface for all literature source clients.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Search for papers matching a query. Sources pass on the filters they
    /// can express natively; the rest are applied by the caller.
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        max_results: usize,
    ) -> anyhow::Result<Vec<PaperMetadata>>;

    /// Look a paper up by DOI. `Ok(None)` when the service has no record.
    async fn resolve_doi(&self, doi: &str) -> anyhow::Result<Option<PaperMetadata>>;

    /// Plain full text for a paper, if the service can supply it.
    async fn fetch_full_text(&self, paper: &Paper) -> anyhow::Result<Option<String>>;
}
