//! Research library over an in-memory source.

use std::sync::Arc;

use chrono::NaiveDate;

use scholara_common::entities::UNKNOWN_AUTHOR;
use scholara_common::{IdGenerator, SearchFilters};
use scholara_ingestion::{LibraryOptions, ResearchLibrary};
use scholara_test_utils::pretty_assertions::assert_eq;
use scholara_test_utils::source::record;
use scholara_test_utils::{fixtures, InMemorySource};

fn library(source: InMemorySource) -> (ResearchLibrary, Arc<InMemorySource>) {
    let source = Arc::new(source);
    let lib = ResearchLibrary::new(source.clone(), Arc::new(IdGenerator::new()), LibraryOptions::default());
    (lib, source)
}

#[tokio::test]
async fn test_import_doi_normalises_and_enriches() {
    let source = InMemorySource::new(vec![record("w1", "Reef bleaching", Some("10.5/reef"), 2021)])
        .with_full_text("10.5/reef", "Full reef text.");
    let (lib, _) = library(source);

    let paper = lib.import_doi("https://doi.org/10.5/REEF").await.unwrap().unwrap();
    assert_eq!(paper.title, "Reef bleaching");
    assert_eq!(paper.year, 2021);
    assert_eq!(paper.full_text.as_deref(), Some("Full reef text."));
}

#[tokio::test]
async fn test_import_unknown_doi_is_none() {
    let (lib, _) = library(InMemorySource::default());
    assert!(lib.import_doi("10.9/nothing").await.unwrap().is_none());
    assert!(lib.import_doi("   ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_import_propagates_source_failure() {
    let (lib, source) = library(InMemorySource::default());
    source.set_failing(true);
    assert!(lib.import_doi("10.5/reef").await.is_err());
}

#[tokio::test]
async fn test_search_applies_year_filter_and_dedups() {
    let source = InMemorySource::new(vec![
        record("w1", "Reef recovery after heat waves", Some("10.5/a"), 2018),
        record("w2", "Reef recovery after heat waves", Some("10.5/a"), 2018),
        record("w3", "Reef fish census", None, 2022),
    ]);
    let (lib, _) = library(source);

    let all = lib.search("reef", &SearchFilters::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let recent = SearchFilters { start_date: NaiveDate::from_ymd_opt(2020, 1, 1), ..Default::default() };
    let hits = lib.search("reef", &recent).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Reef fish census");
}

#[tokio::test]
async fn test_enrich_survives_failure() {
    let (lib, source) = library(InMemorySource::default());
    source.set_failing(true);
    let paper = lib.enrich(fixtures::paper("p1", "Cas9")).await;
    assert!(paper.full_text.is_none());
    assert_eq!(paper.authors, vec!["Jane Doe".to_string(), "John Smith".to_string()]);
    assert_ne!(paper.authors[0], UNKNOWN_AUTHOR);
}
