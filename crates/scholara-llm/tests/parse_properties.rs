//! Parser properties: confidences land in [0, 1] or are rejected, and
//! marked-text evidence lists come back whole.

use proptest::prelude::*;

use scholara_llm::parse::{parse_hypotheses, parse_verification, ParseError};

fn evidence_item() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z][a-zA-Z ]{0,30}[a-zA-Z]",
        "[a-z]{1,12}".prop_map(|w| format!("Hypothesis {w} in mice")),
    ]
}

proptest! {
    #[test]
    fn marked_verification_confidence_in_unit_range(c in -50.0f64..150.0) {
        let text = format!("Status: verified\nConfidence: {c}\n\nEvidence:\n- E\n");
        match parse_verification(&text, true) {
            Ok(parsed) => prop_assert!((0.0..=1.0).contains(&parsed.value.confidence)),
            Err(e) => {
                prop_assert!(matches!(e, ParseError::OutOfRange(_)));
                prop_assert!(!(0.0..=100.0).contains(&c));
            }
        }
    }

    #[test]
    fn json_hypothesis_confidence_in_unit_range(c in -500.0f64..500.0, ev in -500.0f64..500.0) {
        let text = format!(
            r#"{{"hypotheses": [{{"statement": "H", "confidence": {c},
                "evidence": [{{"text": "E", "confidence": {ev}}}]}}]}}"#
        );
        if let Ok(parsed) = parse_hypotheses(&text, false) {
            let h = &parsed.value[0];
            prop_assert!(h.confidence.is_some_and(|v| (0.0..=1.0).contains(&v)));
            prop_assert!(h.evidence[0].confidence.is_some_and(|v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn marked_evidence_items_are_kept(items in prop::collection::vec(evidence_item(), 1..8)) {
        let list: String = items.iter().map(|i| format!("- {i}\n")).collect();
        let text = format!("Hypothesis 1: Delivery improves with lipid carriers.\n\nSupporting Evidence:\n{list}");

        let hs = parse_hypotheses(&text, true).unwrap().value;
        prop_assert_eq!(hs.len(), 1);
        let got: Vec<&str> = hs[0].evidence.iter().map(|e| e.text.as_str()).collect();
        let want: Vec<&str> = items.iter().map(|i| i.trim()).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn arbitrary_text_never_yields_empty_statements(text in "\\PC{0,200}") {
        if let Ok(parsed) = parse_hypotheses(&text, true) {
            prop_assert!(parsed.value.iter().all(|h| !h.statement.is_empty()));
        }
    }
}
