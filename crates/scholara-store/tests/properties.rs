//! Confidence values stay in [0, 1] whatever the model reports.

use std::sync::Arc;

use proptest::prelude::*;

use scholara_common::{Evidence, IdGenerator};
use scholara_ingestion::{LibraryOptions, ResearchLibrary};
use scholara_llm::router::RoutingPolicy;
use scholara_llm::{Analyst, AnalystOptions, LlmRouter};
use scholara_store::{EntityStore, FundingMatcher, ResearchService};
use scholara_test_utils::{InMemorySource, ScriptedBackend};

fn service(reply: String) -> ResearchService {
    let backend = Arc::new(ScriptedBackend::new().with_reply(reply));
    let ids = Arc::new(IdGenerator::new());
    let mut router = LlmRouter::new(RoutingPolicy::default());
    router.register_backend("openai", backend);
    ResearchService::new(
        EntityStore::from_seed(),
        Analyst::new(Arc::new(router), AnalystOptions::default()),
        ResearchLibrary::new(Arc::new(InMemorySource::default()), ids.clone(), LibraryOptions::default()),
        FundingMatcher::new(Vec::new(), 0),
        ids,
    )
}

proptest! {
    #[test]
    fn evidence_confidence_is_clamped(c in prop::num::f64::ANY) {
        let e = Evidence::new("e", "text", "src", c);
        prop_assert!((0.0..=1.0).contains(&e.confidence));
    }

    #[test]
    fn verified_claim_confidences_in_unit_range(
        claim_conf in -50.0f64..150.0,
        ev_conf in -50.0f64..150.0,
    ) {
        let reply = format!(
            r#"{{"status": "verified", "confidence": {claim_conf},
                "evidence": [{{"text": "E", "confidence": {ev_conf}}}]}}"#
        );
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let result = rt.block_on(async {
            let svc = service(reply);
            svc.verify_claim("demo").await
        });

        // Out-of-range values may be rejected; whatever is stored is in range.
        if let Ok(outcome) = result {
            let claim = outcome.applied().unwrap();
            prop_assert!((0.0..=1.0).contains(&claim.confidence));
            prop_assert!(claim.supporting_evidence.iter().all(|e| (0.0..=1.0).contains(&e.confidence)));
        }
    }
}
