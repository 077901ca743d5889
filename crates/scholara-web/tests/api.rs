//! HTTP API through the full router, driven with `oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use scholara_common::{seed, IdGenerator};
use scholara_ingestion::{LibraryOptions, ResearchLibrary};
use scholara_llm::router::RoutingPolicy;
use scholara_llm::{Analyst, AnalystOptions, LlmRouter};
use scholara_store::{EntityStore, FundingMatcher, ResearchService};
use scholara_test_utils::pretty_assertions::assert_eq;
use scholara_test_utils::source::record;
use scholara_test_utils::{fixtures, InMemorySource, ScriptedBackend};
use scholara_web::router::build_router;
use scholara_web::state::AppState;

fn app(backend: Arc<ScriptedBackend>, source: InMemorySource) -> Router {
    let ids = Arc::new(IdGenerator::new());
    let mut router = LlmRouter::new(RoutingPolicy::default());
    router.register_backend("openai", backend);
    let service = ResearchService::new(
        EntityStore::from_seed(),
        Analyst::new(Arc::new(router), AnalystOptions::default()),
        ResearchLibrary::new(Arc::new(source), ids.clone(), LibraryOptions::default()),
        FundingMatcher::new(seed::funding_opportunities(), 0),
        ids,
    );
    build_router(AppState::new(Arc::new(service)))
}

fn seeded_app() -> Router {
    app(Arc::new(ScriptedBackend::new()), InMemorySource::default())
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(seeded_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["inFlight"], 0);
}

#[tokio::test]
async fn test_state_snapshot_is_camel_case() {
    let (status, body) = send(seeded_app(), "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["papers"].as_array().unwrap().len(), 3);
    assert_eq!(body["fundingOpportunities"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_upload_returns_paper() {
    let (status, body) = send(seeded_app(), "POST", "/api/papers", Some(json!({ "authors": "" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Untitled Paper");
    assert_eq!(body["authors"], json!(["Unknown Author"]));
}

#[tokio::test]
async fn test_missing_paper_is_404() {
    let (status, body) = send(seeded_app(), "GET", "/api/papers/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["cause"], "not_found");

    let (status, body) = send(seeded_app(), "POST", "/api/papers/nope/summary", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Failed to generate summary");
}

#[tokio::test]
async fn test_summary_through_api() {
    let backend = Arc::new(ScriptedBackend::new().with_reply(fixtures::JSON_SUMMARY));
    let (status, body) = send(app(backend, InMemorySource::default()), "POST", "/api/papers/paper2/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Reefs lose cover under heat stress.");
    assert_eq!(body["keyFindings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_model_failure_is_502_with_cause() {
    let backend = Arc::new(ScriptedBackend::new().with_reply("no structure here"));
    let (status, body) = send(app(backend, InMemorySource::default()), "POST", "/api/papers/paper2/summary", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to generate summary");
    assert_eq!(body["cause"], "malformed_response");

    // Exhausted script: the backend is unavailable.
    let (status, body) = send(seeded_app(), "POST", "/api/papers/demo/hypotheses", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["cause"], "service_unavailable");
}

#[tokio::test]
async fn test_orphan_claim_is_409() {
    let (status, body) =
        send(seeded_app(), "POST", "/api/hypotheses/ghost/claims", Some(json!({ "statement": "x" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["cause"], "integrity");

    let (status, body) =
        send(seeded_app(), "POST", "/api/hypotheses/demo/claims", Some(json!({ "statement": "y holds" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["verificationStatus"], "unverified");
}

#[tokio::test]
async fn test_verify_through_api() {
    let backend = Arc::new(ScriptedBackend::new().with_reply(fixtures::JSON_VERIFICATION));
    let (status, body) = send(app(backend, InMemorySource::default()), "POST", "/api/claims/demo/verify", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "demo");
    assert_eq!(body["hypothesisId"], "demo");
    assert_eq!(body["verificationStatus"], "verified");
}

#[tokio::test]
async fn test_doi_not_found_message() {
    let (status, body) = send(seeded_app(), "POST", "/api/papers/doi", Some(json!({ "doi": "10.9/none" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Paper not found");
}

#[tokio::test]
async fn test_search_requires_query_and_merges() {
    let (status, _) = send(seeded_app(), "GET", "/api/search?q=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let source = InMemorySource::new(vec![record("w1", "Reef recovery", Some("10.5/r"), 2020)]);
    let app = app(Arc::new(ScriptedBackend::new()), source);
    let (status, body) = send(app.clone(), "GET", "/api/search?q=reef", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, papers) = send(app, "GET", "/api/papers", None).await;
    assert_eq!(papers.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_funding_rank_and_filter() {
    let app = seeded_app();
    let (status, body) = send(app.clone(), "POST", "/api/papers/demo/funding", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "fund1");

    let (status, body) = send(app, "GET", "/api/funding?minAmount=1000000", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body.as_array().unwrap().iter().filter_map(|f| f["id"].as_str()).collect();
    assert_eq!(ids, vec!["fund1"]);
}

#[tokio::test]
async fn test_operations_board_reports_failure() {
    let app = seeded_app();
    send(app.clone(), "POST", "/api/papers/demo/summary", None).await;

    let (status, body) = send(app, "GET", "/api/operations", None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = &body.as_array().unwrap()[0];
    assert_eq!(entry["operation"], "generate_summary");
    assert_eq!(entry["target"], "demo");
    assert_eq!(entry["state"], "failed");
    assert_eq!(entry["message"], "Failed to generate summary");
}

#[tokio::test]
async fn test_library_ranks_held_papers() {
    let (status, body) = send(seeded_app(), "GET", "/api/library?q=crispr", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "demo");
}
