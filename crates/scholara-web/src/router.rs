//! Axum router. Maps all URL paths to handlers.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    papers::{get_state, list_papers, get_paper, upload_paper, add_paper_by_doi, select_paper, list_hypotheses},
    analysis::{generate_summary, generate_hypotheses},
    claims::{add_claim, list_claims, verify_claim},
    funding::{find_funding, list_funding},
    search::{search_papers, search_library},
    status::{list_operations, recent_llm_calls, health},
};
use crate::sse::sse_handler;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/health", get(health))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // Store
        .route("/api/state",                   get(get_state))
        .route("/api/papers",                  get(list_papers).post(upload_paper))
        .route("/api/papers/doi",              post(add_paper_by_doi))
        .route("/api/papers/{id}",             get(get_paper))
        .route("/api/papers/{id}/select",      post(select_paper))
        .route("/api/papers/{id}/summary",     post(generate_summary))
        .route("/api/papers/{id}/hypotheses",  get(list_hypotheses).post(generate_hypotheses))
        .route("/api/papers/{id}/funding",     post(find_funding))
        .route("/api/hypotheses/{id}/claims",  get(list_claims).post(add_claim))
        .route("/api/claims/{id}/verify",      post(verify_claim))
        .route("/api/funding",                 get(list_funding))
        .route("/api/search",                  get(search_papers))
        .route("/api/library",                 get(search_library))

        // Status
        .route("/api/operations", get(list_operations))
        .route("/api/audit",      get(recent_llm_calls))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
