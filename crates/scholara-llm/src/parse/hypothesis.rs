use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::{
    checked_confidence, labelled_value, list_items, parse_with, EvidenceDraft, EvidenceJson,
    ParseError, Parsed,
};
use scholara_common::confidence::parse_confidence;

const HYPOTHESIS_MARKER: &str = "Hypothesis ";
const EVIDENCE_HEADING: &str = "Supporting Evidence:";

#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisDraft {
    pub statement: String,
    pub confidence: Option<f64>,
    pub evidence: Vec<EvidenceDraft>,
}

#[derive(Debug, Deserialize)]
struct HypothesesJson {
    hypotheses: Vec<HypothesisJson>,
}

#[derive(Debug, Deserialize)]
struct HypothesisJson {
    statement: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default, alias = "supporting_evidence", alias = "supportingEvidence")]
    evidence: Vec<EvidenceJson>,
}

pub fn parse_hypotheses(
    text: &str,
    legacy_fallback: bool,
) -> Result<Parsed<Vec<HypothesisDraft>>, ParseError> {
    parse_with(text, legacy_fallback, from_json, from_text)
}

fn from_json(j: HypothesesJson) -> Result<Vec<HypothesisDraft>, ParseError> {
    if j.hypotheses.is_empty() {
        return Err(ParseError::Schema("no hypotheses in response".into()));
    }
    j.hypotheses
        .into_iter()
        .map(|h| {
            let statement = h.statement.trim().to_string();
            if statement.is_empty() {
                return Err(ParseError::Schema("hypothesis statement is empty".into()));
            }
            Ok(HypothesisDraft {
                statement,
                confidence: h.confidence.map(checked_confidence).transpose()?,
                evidence: h.evidence.into_iter().map(EvidenceJson::validate).collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

fn hypothesis_split() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "Hypothesis <n>:" at the start of a line, optionally behind markdown
    // heading or emphasis characters. The number is required so prose such
    // as "Hypothesis testing showed..." stays inside its block.
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t#*]*Hypothesis[ \t]+\d+[ \t]*(?:[:.)]|$)\**").expect("static regex")
    })
}

fn evidence_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:Supporting )?Evidence:").expect("static regex"))
}

fn from_text(text: &str) -> Result<Vec<HypothesisDraft>, ParseError> {
    // The first piece is whatever precedes the first marker (preamble).
    let blocks: Vec<&str> = hypothesis_split().split(text).skip(1).collect();
    if blocks.is_empty() {
        return Err(ParseError::MissingSection(HYPOTHESIS_MARKER));
    }

    let mut drafts = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        match parse_block(block)? {
            Some(d) => drafts.push(d),
            None => tracing::warn!(index, "Hypothesis block has no evidence heading; skipped"),
        }
    }

    if drafts.is_empty() {
        return Err(ParseError::MissingSection(EVIDENCE_HEADING));
    }
    Ok(drafts)
}

/// `Ok(None)` when the block lacks an evidence heading.
fn parse_block(block: &str) -> Result<Option<HypothesisDraft>, ParseError> {
    let Some(m) = evidence_heading().find(block) else {
        return Ok(None);
    };

    let mut confidence = None;
    let mut statement_lines = Vec::new();
    for line in block[..m.start()].lines() {
        if let Some(value) = labelled_value(line, "confidence") {
            confidence = parse_confidence(value).map_err(ParseError::OutOfRange)?;
            continue;
        }
        let line = line.trim();
        if !line.is_empty() {
            statement_lines.push(line);
        }
    }

    let statement = statement_lines.join(" ").trim_matches('*').trim().to_string();
    if statement.is_empty() {
        return Err(ParseError::Schema("hypothesis statement is empty".into()));
    }

    let evidence = list_items(&block[m.end()..])
        .into_iter()
        .map(|text| EvidenceDraft { text, source: None, confidence: None })
        .collect();

    Ok(Some(HypothesisDraft { statement, confidence, evidence }))
}
