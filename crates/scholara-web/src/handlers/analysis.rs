//! Model-backed analysis of papers.

use axum::{
    extract::{Path, State},
    Json,
};

use scholara_common::{Hypothesis, Paper};

use super::error::{applied, ApiError};
use crate::state::SharedState;

/// POST /api/papers/{id}/summary
pub async fn generate_summary(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Paper>, ApiError> {
    let outcome = state.service.generate_summary(&id).await?;
    Ok(Json(applied(outcome)?))
}

/// POST /api/papers/{id}/hypotheses
pub async fn generate_hypotheses(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Hypothesis>>, ApiError> {
    let outcome = state.service.generate_hypothesis(&id).await?;
    Ok(Json(applied(outcome)?))
}
