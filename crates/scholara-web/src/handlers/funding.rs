//! Funding matches.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use scholara_common::FundingOpportunity;
use scholara_store::FundingQuery;

use super::error::{applied, ApiError};
use crate::state::SharedState;

/// POST /api/papers/{id}/funding - Rank the catalogue against a paper
pub async fn find_funding(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<FundingOpportunity>>, ApiError> {
    let outcome = state.service.find_funding(&id).await?;
    Ok(Json(applied(outcome)?))
}

/// GET /api/funding?term=&minAmount=&maxMatchScore=
pub async fn list_funding(
    State(state): State<SharedState>,
    Query(query): Query<FundingQuery>,
) -> Json<Vec<FundingOpportunity>> {
    Json(state.service.filter_funding(&query).await)
}
