//! Analyst round trips through the router with a scripted backend.

use std::sync::Arc;

use scholara_common::VerificationStatus;
use scholara_llm::parse::{ParseError, ResponseFormat};
use scholara_llm::router::RoutingPolicy;
use scholara_llm::{AnalysisError, Analyst, AnalystOptions, LlmRouter};
use scholara_test_utils::fixtures;
use scholara_test_utils::pretty_assertions::assert_eq;
use scholara_test_utils::ScriptedBackend;

fn analyst(backend: Arc<ScriptedBackend>, options: AnalystOptions) -> Analyst {
    let mut router = LlmRouter::new(RoutingPolicy::default());
    router.register_backend("openai", backend);
    Analyst::new(Arc::new(router), options)
}

#[tokio::test]
async fn test_summary_from_marked_text() {
    let backend = Arc::new(ScriptedBackend::new().with_reply(fixtures::MARKED_SUMMARY));
    let a = analyst(backend.clone(), AnalystOptions::default());
    let paper = fixtures::paper("p1", "Cas9 specificity");

    let parsed = a.summarize(&paper).await.unwrap();
    assert_eq!(parsed.format, ResponseFormat::MarkedText);
    assert_eq!(parsed.value.summary, "The paper shows improved Cas9 specificity.");
    assert_eq!(parsed.value.key_findings.len(), 3);

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Title: Cas9 specificity"));
}

#[tokio::test]
async fn test_hypotheses_and_verification() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_reply(fixtures::MARKED_HYPOTHESES)
            .with_reply(fixtures::JSON_VERIFICATION),
    );
    let a = analyst(backend, AnalystOptions::default());

    let hs = a.hypothesize(&fixtures::paper("p1", "Cas9")).await.unwrap().value;
    assert_eq!(hs.len(), 2);
    assert_eq!(hs[1].confidence, Some(0.7));

    let v = a.verify(&fixtures::claim("c1", "h1", "Cas9 reduces off-target edits")).await.unwrap();
    assert_eq!(v.format, ResponseFormat::Json);
    assert_eq!(v.value.status, VerificationStatus::Verified);
}

#[tokio::test]
async fn test_fallback_disabled_rejects_marked_text() {
    let backend = Arc::new(ScriptedBackend::new().with_reply(fixtures::MARKED_SUMMARY));
    let options = AnalystOptions { legacy_text_fallback: false, ..Default::default() };
    let a = analyst(backend, options);

    let err = a.summarize(&fixtures::paper("p1", "T")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Parse(ParseError::NotStructured)));
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_llm_error() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push_failure("overloaded");
    let a = analyst(backend, AnalystOptions::default());

    let err = a.summarize(&fixtures::paper("p1", "T")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Llm(_)));
    assert_eq!(a.router().audit().recent(1)[0].succeeded, false);
}
