//! Response parsing for language-model completions.
//!
//! The contract is a fixed-shape JSON object per task. When a completion
//! carries no JSON object and the legacy fallback is enabled, a marker parser
//! reads the older free-text layout instead. Both paths fail loudly with a
//! `ParseError` rather than producing half-filled records.

pub mod summary;
pub mod hypothesis;
pub mod verification;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scholara_common::confidence::normalise_confidence;

pub use hypothesis::{parse_hypotheses, HypothesisDraft};
pub use summary::{parse_summary, SummaryDraft, MAX_KEY_FINDINGS};
pub use verification::{parse_verification, VerificationDraft};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("completion is empty")]
    Empty,
    #[error("completion is not a JSON object and the text fallback is disabled")]
    NotStructured,
    #[error("required section '{0}' is missing")]
    MissingSection(&'static str),
    #[error("response does not match the expected schema: {0}")]
    Schema(String),
    #[error("confidence out of range: {0}")]
    OutOfRange(String),
    #[error("unknown verification status '{0}'")]
    UnknownStatus(String),
}

/// Which layout a completion was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Json,
    MarkedText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub format: ResponseFormat,
}

impl<T> Parsed<T> {
    fn json(value: T) -> Self {
        Self { value, format: ResponseFormat::Json }
    }

    fn text(value: T) -> Self {
        Self { value, format: ResponseFormat::MarkedText }
    }
}

/// Evidence as read from a completion, before ids and defaults are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceDraft {
    pub text: String,
    pub source: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EvidenceJson {
    text: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl EvidenceJson {
    fn validate(self) -> Result<EvidenceDraft, ParseError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(ParseError::Schema("evidence text is empty".into()));
        }
        Ok(EvidenceDraft {
            text,
            source: self.source.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            confidence: self.confidence.map(checked_confidence).transpose()?,
        })
    }
}

fn checked_confidence(value: f64) -> Result<f64, ParseError> {
    normalise_confidence(value).ok_or_else(|| ParseError::OutOfRange(value.to_string()))
}

/// What the JSON probe found in a completion.
enum JsonProbe<T> {
    Valid(T),
    Invalid(String),
    Absent,
}

/// Deserialize the first `{ … }` span of a completion. Code fences and
/// surrounding prose are tolerated.
fn probe_json<T: serde::de::DeserializeOwned>(text: &str) -> JsonProbe<T> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return JsonProbe::Absent;
    };
    if end < start {
        return JsonProbe::Absent;
    }
    match serde_json::from_str::<T>(&text[start..=end]) {
        Ok(v) => JsonProbe::Valid(v),
        Err(e) => JsonProbe::Invalid(e.to_string()),
    }
}

/// Shared driver: JSON first, then the marker parser when allowed.
fn parse_with<J, T>(
    text: &str,
    legacy_fallback: bool,
    from_json: impl FnOnce(J) -> Result<T, ParseError>,
    from_text: impl FnOnce(&str) -> Result<T, ParseError>,
) -> Result<Parsed<T>, ParseError>
where
    J: serde::de::DeserializeOwned,
{
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    match probe_json::<J>(text) {
        JsonProbe::Valid(j) => from_json(j).map(Parsed::json),
        JsonProbe::Invalid(e) if !legacy_fallback => Err(ParseError::Schema(e)),
        JsonProbe::Absent if !legacy_fallback => Err(ParseError::NotStructured),
        JsonProbe::Invalid(e) => {
            tracing::debug!(error = %e, "JSON probe failed, using marker parser");
            from_text(text).map(Parsed::text)
        }
        JsonProbe::Absent => from_text(text).map(Parsed::text),
    }
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Bullets (•, -, –, and "* " but not "**"), "1." / "2)" / "3:" numbering, "(4)"
        Regex::new(r"^\s*(?:[•\-–]+|\*(?:\s|$)|\d+[.):]|\(\d+\))\s*").expect("static regex")
    })
}

/// Strip one leading bullet or numbering marker and surrounding whitespace,
/// plus bold emphasis wrapping the whole item.
pub fn strip_marker(line: &str) -> String {
    let item = marker_regex().replace(line, "");
    let item = item.trim();
    item.strip_prefix("**")
        .and_then(|i| i.strip_suffix("**"))
        .filter(|i| !i.trim().is_empty())
        .unwrap_or(item)
        .trim()
        .to_string()
}

/// Non-empty lines with markers stripped.
fn list_items(block: &str) -> Vec<String> {
    block
        .lines()
        .map(strip_marker)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Value of a `Label: value` line whose label contains `key`
/// (case-insensitive). Bullets and markdown emphasis around the label are
/// ignored; labels longer than four words are treated as prose.
fn labelled_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (label, value) = line.split_once(':')?;
    let label = label.trim().trim_start_matches(['-', '*', '•', ' ']).trim_matches('*').trim();
    if label.split_whitespace().count() > 4 {
        return None;
    }
    if label.to_lowercase().contains(key) {
        Some(value.trim().trim_matches('*').trim())
    } else {
        None
    }
}
