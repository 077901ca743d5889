use serde::Deserialize;

use super::{list_items, parse_with, ParseError, Parsed};

/// At most this many key findings are kept per paper.
pub const MAX_KEY_FINDINGS: usize = 5;

const FINDINGS_HEADING: &str = "Key Findings:";

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDraft {
    pub summary: String,
    pub key_findings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryJson {
    summary: String,
    #[serde(default, alias = "keyFindings")]
    key_findings: Vec<String>,
}

pub fn parse_summary(text: &str, legacy_fallback: bool) -> Result<Parsed<SummaryDraft>, ParseError> {
    parse_with(text, legacy_fallback, from_json, from_text)
}

fn from_json(j: SummaryJson) -> Result<SummaryDraft, ParseError> {
    let findings = j
        .key_findings
        .iter()
        .map(|f| super::strip_marker(f))
        .filter(|f| !f.is_empty())
        .collect();
    finish(j.summary.trim().to_string(), findings)
}

fn from_text(text: &str) -> Result<SummaryDraft, ParseError> {
    let idx = text.find(FINDINGS_HEADING).ok_or(ParseError::MissingSection(FINDINGS_HEADING))?;
    let head = text[..idx].trim();
    let summary = head
        .strip_prefix("Summary:")
        .map(str::trim)
        .unwrap_or(head)
        .to_string();
    let findings = list_items(&text[idx + FINDINGS_HEADING.len()..]);
    finish(summary, findings)
}

fn finish(summary: String, mut key_findings: Vec<String>) -> Result<SummaryDraft, ParseError> {
    if summary.is_empty() {
        return Err(ParseError::Schema("summary is empty".into()));
    }
    if key_findings.len() > MAX_KEY_FINDINGS {
        tracing::warn!(count = key_findings.len(), "Model returned too many key findings; truncating");
        key_findings.truncate(MAX_KEY_FINDINGS);
    }
    Ok(SummaryDraft { summary, key_findings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ResponseFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_marked_text_summary() {
        let text = "The study shows improved Cas9 specificity.\n\nKey Findings:\n\
                    1. Variant with 90% fewer off-target edits\n\
                    • CFTR correction in epithelial cells\n\
                    \n\
                    - Improved delivery system\n";
        let parsed = parse_summary(text, true).unwrap();
        assert_eq!(parsed.format, ResponseFormat::MarkedText);
        assert_eq!(parsed.value.summary, "The study shows improved Cas9 specificity.");
        assert_eq!(
            parsed.value.key_findings,
            vec![
                "Variant with 90% fewer off-target edits",
                "CFTR correction in epithelial cells",
                "Improved delivery system",
            ]
        );
    }

    #[test]
    fn test_json_summary() {
        let text = r#"Here you go: {"summary": "Short.", "key_findings": ["- A", "B"]}"#;
        let parsed = parse_summary(text, false).unwrap();
        assert_eq!(parsed.format, ResponseFormat::Json);
        assert_eq!(parsed.value.key_findings, vec!["A", "B"]);
    }

    #[test]
    fn test_findings_capped_at_five() {
        let items: Vec<String> = (1..=8).map(|i| format!("{i}. finding {i}")).collect();
        let text = format!("Summary: S\n\nKey Findings:\n{}", items.join("\n"));
        let parsed = parse_summary(&text, true).unwrap();
        assert_eq!(parsed.value.summary, "S");
        assert_eq!(parsed.value.key_findings.len(), MAX_KEY_FINDINGS);
        assert_eq!(parsed.value.key_findings[4], "finding 5");
    }

    #[test]
    fn test_missing_heading_is_explicit() {
        assert_eq!(
            parse_summary("Just prose without findings.", true),
            Err(ParseError::MissingSection("Key Findings:"))
        );
    }

    #[test]
    fn test_text_rejected_without_fallback() {
        assert_eq!(
            parse_summary("S\n\nKey Findings:\n- a", false),
            Err(ParseError::NotStructured)
        );
    }

    #[test]
    fn test_empty_summary_rejected() {
        assert!(matches!(
            parse_summary(r#"{"summary": "  ", "key_findings": []}"#, true),
            Err(ParseError::Schema(_))
        ));
        assert_eq!(parse_summary("   ", true), Err(ParseError::Empty));
    }
}
