use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use scholara_common::{Paper, SearchFilters};
use scholara_ingestion::models::{Author, IngestionSource, PaperMetadata};
use scholara_ingestion::LiteratureSource;

/// A `LiteratureSource` over a fixed list of records. Search is a
/// case-insensitive substring match on title and abstract.
#[derive(Default)]
pub struct InMemorySource {
    records: Mutex<Vec<PaperMetadata>>,
    /// Full texts keyed by paper id or DOI.
    full_texts: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl InMemorySource {
    pub fn new(records: Vec<PaperMetadata>) -> Self {
        Self { records: Mutex::new(records), ..Default::default() }
    }

    pub fn with_full_text(self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.full_texts.lock().unwrap().insert(key.into(), text.into());
        self
    }

    /// Every call fails while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("literature service unreachable");
        }
        Ok(())
    }
}

/// A metadata record with the given title, DOI and year.
pub fn record(source_id: &str, title: &str, doi: Option<&str>, year: i32) -> PaperMetadata {
    PaperMetadata {
        source_id: Some(source_id.to_string()),
        doi: doi.map(String::from),
        title: title.to_string(),
        abstract_text: Some(format!("Abstract of {title}.")),
        authors: vec![Author::named("Ada Researcher")],
        journal: Some("Journal of Tests".to_string()),
        year: Some(year),
        source: IngestionSource::Memory,
        full_text_url: None,
    }
}

#[async_trait]
impl LiteratureSource for InMemorySource {
    fn name(&self) -> &'static str {
        IngestionSource::Memory.as_str()
    }

    async fn search(
        &self,
        query: &str,
        _filters: &SearchFilters,
        max_results: usize,
    ) -> anyhow::Result<Vec<PaperMetadata>> {
        self.check()?;
        let q = query.to_lowercase();
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&q)
                    || r.abstract_text.as_deref().unwrap_or("").to_lowercase().contains(&q)
            })
            .take(max_results)
            .cloned()
            .collect())
    }

    async fn resolve_doi(&self, doi: &str) -> anyhow::Result<Option<PaperMetadata>> {
        self.check()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.doi.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(doi)))
            .cloned())
    }

    async fn fetch_full_text(&self, paper: &Paper) -> anyhow::Result<Option<String>> {
        self.check()?;
        let texts = self.full_texts.lock().unwrap();
        Ok(texts
            .get(&paper.id)
            .or_else(|| paper.doi.as_ref().and_then(|d| texts.get(d)))
            .cloned())
    }
}
