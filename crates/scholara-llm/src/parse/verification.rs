use serde::Deserialize;

use scholara_common::confidence::parse_confidence;
use scholara_common::VerificationStatus;

use super::{
    checked_confidence, labelled_value, list_items, parse_with, EvidenceDraft, EvidenceJson,
    ParseError, Parsed,
};

const EVIDENCE_HEADING: &str = "Evidence:";

/// Used when a marked-text response has no confidence line.
pub const DEFAULT_VERIFICATION_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationDraft {
    pub status: VerificationStatus,
    pub confidence: f64,
    pub evidence: Vec<EvidenceDraft>,
}

#[derive(Debug, Deserialize)]
struct VerificationJson {
    #[serde(alias = "verification_status", alias = "verificationStatus")]
    status: String,
    confidence: f64,
    #[serde(default, alias = "supporting_evidence", alias = "supportingEvidence")]
    evidence: Vec<EvidenceJson>,
}

pub fn parse_verification(
    text: &str,
    legacy_fallback: bool,
) -> Result<Parsed<VerificationDraft>, ParseError> {
    parse_with(text, legacy_fallback, from_json, from_text)
}

/// "Verified (high confidence)" reads as verified.
fn status_from(label: &str) -> Result<VerificationStatus, ParseError> {
    VerificationStatus::from_label(label)
        .or_else(|| label.split(['(', ',', ';']).next().and_then(VerificationStatus::from_label))
        .ok_or_else(|| ParseError::UnknownStatus(label.to_string()))
}

fn from_json(j: VerificationJson) -> Result<VerificationDraft, ParseError> {
    Ok(VerificationDraft {
        status: status_from(&j.status)?,
        confidence: checked_confidence(j.confidence)?,
        evidence: j.evidence.into_iter().map(EvidenceJson::validate).collect::<Result<_, _>>()?,
    })
}

/// Marked text: `Status:` and `Confidence:` lines anywhere, evidence items
/// after the first `Evidence:` heading. A missing status reads as
/// unverified and a missing evidence section as no evidence; an
/// unrecognised status label or an out-of-range confidence is an error.
fn from_text(text: &str) -> Result<VerificationDraft, ParseError> {
    let status = match text.lines().find_map(|l| labelled_value(l, "status")) {
        Some(label) => status_from(label)?,
        None => VerificationStatus::Unverified,
    };

    let confidence = match text.lines().find_map(|l| labelled_value(l, "confidence")) {
        Some(value) => parse_confidence(value)
            .map_err(ParseError::OutOfRange)?
            .unwrap_or(DEFAULT_VERIFICATION_CONFIDENCE),
        None => DEFAULT_VERIFICATION_CONFIDENCE,
    };

    let evidence = match text.find(EVIDENCE_HEADING) {
        Some(idx) => list_items(&text[idx + EVIDENCE_HEADING.len()..])
            .into_iter()
            .filter(|l| labelled_value(l, "status").is_none() && labelled_value(l, "confidence").is_none())
            .map(|text| EvidenceDraft { text, source: None, confidence: None })
            .collect(),
        None => Vec::new(),
    };

    Ok(VerificationDraft { status, confidence, evidence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ResponseFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_marked_verification() {
        let text = "Verification Status: Partially Verified\n\
                    Confidence: 0.64\n\n\
                    Evidence:\n\
                    - Liu et al. replicated the reduction\n\
                    - Sequencing showed fewer edits\n";
        let parsed = parse_verification(text, true).unwrap();
        assert_eq!(parsed.format, ResponseFormat::MarkedText);
        let v = parsed.value;
        assert_eq!(v.status, VerificationStatus::PartiallyVerified);
        assert_eq!(v.confidence, 0.64);
        assert_eq!(v.evidence.len(), 2);
        assert_eq!(v.evidence[0].text, "Liu et al. replicated the reduction");
    }

    #[test]
    fn test_defaults_when_lines_missing() {
        let v = parse_verification("The claim could not be assessed.", true).unwrap().value;
        assert_eq!(v.status, VerificationStatus::Unverified);
        assert_eq!(v.confidence, DEFAULT_VERIFICATION_CONFIDENCE);
        assert!(v.evidence.is_empty());
    }

    #[test]
    fn test_status_lines_after_evidence_are_not_evidence() {
        let text = "Evidence:\n- E1\nStatus: disputed\nConfidence: 30%\n";
        let v = parse_verification(text, true).unwrap().value;
        assert_eq!(v.status, VerificationStatus::Disputed);
        assert_eq!(v.confidence, 0.3);
        assert_eq!(v.evidence.len(), 1);
    }

    #[test]
    fn test_unknown_status_is_explicit() {
        assert_eq!(
            parse_verification("Status: plausible\nEvidence:\n- x", true),
            Err(ParseError::UnknownStatus("plausible".into()))
        );
    }

    #[test]
    fn test_status_with_trailing_remark() {
        let v = parse_verification("**Status:** Verified (strong support)", true).unwrap().value;
        assert_eq!(v.status, VerificationStatus::Verified);
    }

    #[test]
    fn test_out_of_range_confidence() {
        assert!(matches!(
            parse_verification("Status: verified\nConfidence: 700", true),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_json_verification() {
        let text = r#"```json
{"status": "verified", "confidence": 0.91,
 "evidence": [{"text": "Replicated in two labs", "source": "J Mol Biol 2023"}]}
```"#;
        let v = parse_verification(text, false).unwrap().value;
        assert_eq!(v.status, VerificationStatus::Verified);
        assert_eq!(v.confidence, 0.91);
        assert_eq!(v.evidence[0].source.as_deref(), Some("J Mol Biol 2023"));
        assert_eq!(v.evidence[0].confidence, None);
    }
}
