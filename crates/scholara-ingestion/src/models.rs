//! Data models for literature records before they enter the store.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use scholara_common::entities::{UNKNOWN_AUTHOR, UNTITLED_PAPER};
use scholara_common::Paper;

/// A paper as a literature service describes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperMetadata {
    /// The service's own identifier (CORE work id). CrossRef has none.
    pub source_id: Option<String>,
    pub doi: Option<String>,
    pub title: String,
    pub abstract_text: Option<String>,
    pub authors: Vec<Author>,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub source: IngestionSource,
    pub full_text_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    pub name: String,
    pub affiliation: Option<String>,
    pub orcid: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), affiliation: None, orcid: None }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IngestionSource {
    Core,
    CrossRef,
    Memory,
}

impl IngestionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionSource::Core     => "core",
            IngestionSource::CrossRef => "crossref",
            IngestionSource::Memory   => "memory",
        }
    }
}

impl PaperMetadata {
    /// Convert into a store paper. The service id is kept when there is
    /// one, otherwise `fallback_id` is used. Missing title, authors and year
    /// get the same fallbacks as a form upload.
    pub fn into_paper(self, fallback_id: impl FnOnce() -> String, now: DateTime<Utc>) -> Paper {
        let id = self
            .source_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(fallback_id);

        let title = match self.title.trim() {
            "" => UNTITLED_PAPER.to_string(),
            t => t.to_string(),
        };

        let mut authors: Vec<String> = self
            .authors
            .into_iter()
            .map(|a| a.name.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if authors.is_empty() {
            authors.push(UNKNOWN_AUTHOR.to_string());
        }

        Paper {
            id,
            title,
            authors,
            journal: self.journal.filter(|j| !j.trim().is_empty()),
            year: self.year.unwrap_or_else(|| now.year()),
            doi: self.doi.filter(|d| !d.trim().is_empty()),
            abstract_text: self.abstract_text.filter(|a| !a.trim().is_empty()),
            full_text: None,
            summary: None,
            key_findings: None,
            uploaded: now,
            mind_map: None,
            knowledge_graph: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> PaperMetadata {
        PaperMetadata {
            source_id: None,
            doi: Some("10.1/x".into()),
            title: "  ".into(),
            abstract_text: Some(String::new()),
            authors: vec![Author::named(" ")],
            journal: None,
            year: None,
            source: IngestionSource::CrossRef,
            full_text_url: None,
        }
    }

    #[test]
    fn test_into_paper_fallbacks() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let p = meta().into_paper(|| "1735787045000".into(), now);
        assert_eq!(p.id, "1735787045000");
        assert_eq!(p.title, UNTITLED_PAPER);
        assert_eq!(p.authors, vec![UNKNOWN_AUTHOR]);
        assert_eq!(p.year, 2025);
        assert_eq!(p.abstract_text, None);
        assert_eq!(p.doi.as_deref(), Some("10.1/x"));
    }

    #[test]
    fn test_source_id_preferred() {
        let mut m = meta();
        m.source_id = Some("core-42".into());
        let p = m.into_paper(|| unreachable!(), Utc::now());
        assert_eq!(p.id, "core-42");
    }
}
