//! Claims under a hypothesis, and their verification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use scholara_common::Claim;

use super::error::{applied, ApiError};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct NewClaim {
    pub statement: String,
}

/// POST /api/hypotheses/{id}/claims
pub async fn add_claim(
    State(state): State<SharedState>,
    Path(hypothesis_id): Path<String>,
    Json(req): Json<NewClaim>,
) -> Result<(StatusCode, Json<Claim>), ApiError> {
    let claim = state.service.add_claim(&hypothesis_id, &req.statement).await?;
    Ok((StatusCode::CREATED, Json(claim)))
}

/// GET /api/hypotheses/{id}/claims
pub async fn list_claims(
    State(state): State<SharedState>,
    Path(hypothesis_id): Path<String>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    state
        .service
        .claims_for(&hypothesis_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("hypothesis '{hypothesis_id}'")))
}

/// POST /api/claims/{id}/verify
pub async fn verify_claim(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Claim>, ApiError> {
    let outcome = state.service.verify_claim(&id).await?;
    Ok(Json(applied(outcome)?))
}
