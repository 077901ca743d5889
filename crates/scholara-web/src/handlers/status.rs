//! Operation status board, LLM audit trail and health.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use scholara_llm::audit::LlmAuditEntry;
use scholara_store::StatusEntry;

use crate::state::SharedState;

/// GET /api/operations
pub async fn list_operations(State(state): State<SharedState>) -> Json<Vec<StatusEntry>> {
    Json(state.service.statuses().await)
}

#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub limit: Option<usize>,
}

/// GET /api/audit?limit=
pub async fn recent_llm_calls(
    State(state): State<SharedState>,
    Query(params): Query<AuditParams>,
) -> Json<Vec<LlmAuditEntry>> {
    let limit = params.limit.unwrap_or(50).min(500);
    Json(state.service.recent_llm_calls(limit))
}

/// GET /health. `inFlight` counts operation keys with a request running.
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "inFlight": state.service.requests_in_flight().await,
    }))
}
