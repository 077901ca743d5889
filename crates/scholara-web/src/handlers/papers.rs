//! Paper collection endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use scholara_common::{Hypothesis, Paper, PaperDraft};
use scholara_store::StoreSnapshot;

use super::error::{applied, ApiError};
use crate::state::SharedState;

/// GET /api/state - Whole store snapshot
pub async fn get_state(State(state): State<SharedState>) -> Json<StoreSnapshot> {
    Json(state.service.snapshot().await)
}

/// GET /api/papers
pub async fn list_papers(State(state): State<SharedState>) -> Json<Vec<Paper>> {
    Json(state.service.papers().await)
}

/// GET /api/papers/{id}
pub async fn get_paper(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Paper>, ApiError> {
    state
        .service
        .paper(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("paper '{id}'")))
}

/// POST /api/papers - Upload form
pub async fn upload_paper(
    State(state): State<SharedState>,
    Json(draft): Json<PaperDraft>,
) -> Result<Json<Paper>, ApiError> {
    let outcome = state.service.upload_paper(draft).await?;
    Ok(Json(applied(outcome)?))
}

#[derive(Debug, Deserialize)]
pub struct DoiRequest {
    pub doi: String,
}

/// POST /api/papers/doi
pub async fn add_paper_by_doi(
    State(state): State<SharedState>,
    Json(req): Json<DoiRequest>,
) -> Result<Json<Paper>, ApiError> {
    if req.doi.trim().is_empty() {
        return Err(ApiError::BadRequest("doi must not be empty".to_string()));
    }
    let outcome = state.service.add_paper_by_doi(&req.doi).await?;
    Ok(Json(applied(outcome)?))
}

/// POST /api/papers/{id}/select
pub async fn select_paper(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Paper>, ApiError> {
    state.service.select_paper(Some(&id)).await?;
    state
        .service
        .paper(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("paper '{id}'")))
}

/// GET /api/papers/{id}/hypotheses
pub async fn list_hypotheses(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Hypothesis>>, ApiError> {
    state
        .service
        .hypotheses_for(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("paper '{id}'")))
}
