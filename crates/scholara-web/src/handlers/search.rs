//! Literature search: remote (merged into the collection) and local ranking.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use scholara_common::{Paper, SearchFilters};

use super::error::{applied, ApiError};
use crate::state::SharedState;

/// Query string for remote search. List filters take comma-separated values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    pub q: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub authors: Option<String>,
    pub journals: Option<String>,
    pub keywords: Option<String>,
    pub domain: Option<String>,
}

fn split_list(value: Option<String>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    (!items.is_empty()).then_some(items)
}

impl SearchParams {
    fn filters(self) -> SearchFilters {
        SearchFilters {
            domain: split_list(self.domain),
            start_date: self.start_date,
            end_date: self.end_date,
            authors: split_list(self.authors),
            keywords: split_list(self.keywords),
            journals: split_list(self.journals),
        }
    }
}

/// GET /api/search?q= - Remote literature search
pub async fn search_papers(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Paper>>, ApiError> {
    let q = params.q.trim().to_string();
    if q.is_empty() {
        return Err(ApiError::BadRequest("q must not be empty".to_string()));
    }
    let outcome = state.service.search_papers(&q, &params.filters()).await?;
    Ok(Json(applied(outcome)?))
}

#[derive(Debug, Deserialize)]
pub struct LibraryParams {
    #[serde(default)]
    pub q: String,
}

/// GET /api/library?q= - Rank held papers against a query
pub async fn search_library(
    State(state): State<SharedState>,
    Query(params): Query<LibraryParams>,
) -> Json<Vec<Paper>> {
    Json(state.service.search_local(&params.q).await)
}
