/// Core research entity types held by the entity store.
/// Field names serialise in camelCase, the shape the web client consumes.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::clamp_unit;

// ---------------------------------------------------------------------------
// Paper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_findings: Option<Vec<String>>,
    pub uploaded: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mind_map: Option<MindMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraphData>,
}

impl Paper {
    /// Title, abstract, summary and key findings joined for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut parts = vec![self.title.as_str()];
        if let Some(a) = &self.abstract_text {
            parts.push(a);
        }
        if let Some(s) = &self.summary {
            parts.push(s);
        }
        if let Some(findings) = &self.key_findings {
            parts.extend(findings.iter().map(String::as_str));
        }
        parts.join(" ")
    }
}

/// Raw upload form input. Every field is optional text, as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaperDraft {
    pub title: String,
    /// Comma-separated author list.
    pub authors: String,
    pub year: String,
    pub journal: String,
    pub doi: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Name of the uploaded file, if one was attached.
    pub file_name: Option<String>,
}

pub const UNTITLED_PAPER: &str = "Untitled Paper";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

impl PaperDraft {
    /// Build a paper from the form, filling the documented fallbacks:
    /// file stem (then "Untitled Paper") for an empty title, "Unknown Author"
    /// for an empty author list and the current year for an unparsable year.
    pub fn into_paper(self, id: String, now: DateTime<Utc>) -> Paper {
        let title = non_empty(&self.title)
            .or_else(|| self.file_name.as_deref().and_then(file_stem))
            .unwrap_or_else(|| UNTITLED_PAPER.to_string());

        let authors: Vec<String> = self
            .authors
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
        let authors = if authors.is_empty() { vec![UNKNOWN_AUTHOR.to_string()] } else { authors };

        let year = self.year.trim().parse::<i32>().unwrap_or_else(|_| now.year());

        Paper {
            id,
            title,
            authors,
            journal: non_empty(&self.journal),
            year,
            doi: non_empty(&self.doi),
            abstract_text: non_empty(&self.abstract_text),
            full_text: None,
            summary: None,
            key_findings: None,
            uploaded: now,
            mind_map: None,
            knowledge_graph: None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// "results.final.pdf" -> "results.final"
fn file_stem(name: &str) -> Option<String> {
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    };
    non_empty(stem)
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    pub id: String,
    pub text: String,
    pub source: String,
    pub confidence: f64,
}

impl Evidence {
    /// Confidence is clamped into [0, 1].
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
            confidence: clamp_unit(confidence),
        }
    }
}

// ---------------------------------------------------------------------------
// Hypothesis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: String,
    pub paper_id: String,
    pub statement: String,
    pub confidence: f64,
    pub supporting_evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph_data: Option<KnowledgeGraphData>,
    pub generated: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    #[serde(rename = "verified")]
    Verified,
    #[serde(rename = "partially verified")]
    PartiallyVerified,
    #[serde(rename = "unverified")]
    Unverified,
    #[serde(rename = "disputed")]
    Disputed,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified          => "verified",
            VerificationStatus::PartiallyVerified => "partially verified",
            VerificationStatus::Unverified        => "unverified",
            VerificationStatus::Disputed          => "disputed",
        }
    }

    /// Parse a status label as a model writes it. Case, surrounding
    /// punctuation and `_`/`-` separators are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let norm: String = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase()
            .replace(['_', '-'], " ");
        match norm.as_str() {
            "verified"           => Some(VerificationStatus::Verified),
            "partially verified" => Some(VerificationStatus::PartiallyVerified),
            "unverified"         => Some(VerificationStatus::Unverified),
            "disputed"           => Some(VerificationStatus::Disputed),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: String,
    pub hypothesis_id: String,
    pub statement: String,
    pub verification_status: VerificationStatus,
    pub supporting_evidence: Vec<Evidence>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub relevance_score: f64,
    pub supports: bool,
}

// ---------------------------------------------------------------------------
// Funding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingOpportunity {
    pub id: String,
    pub title: String,
    pub organization: String,
    /// Display string, e.g. "$500,000 - $1,000,000".
    pub amount: String,
    pub deadline: NaiveDate,
    pub description: String,
    pub eligibility: String,
    pub url: String,
    /// 0–100
    pub match_score: u8,
    pub keywords: Vec<String>,
}

impl FundingOpportunity {
    /// Lower bound of the advertised amount, e.g. 500000.0 for
    /// "$500,000 - $1,000,000". `None` when the string has no number.
    pub fn min_amount(&self) -> Option<f64> {
        let digits: String = self
            .amount
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .filter(|c| *c != ',')
            .collect();
        digits.parse().ok()
    }

    pub fn mentions(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.organization.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(&term))
    }
}

// ---------------------------------------------------------------------------
// Graph data attached to papers and hypotheses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GraphNodeKind {
    Concept,
    Paper,
    Author,
    Hypothesis,
    Evidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GraphNodeKind,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MindMapData {
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<MindMapEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MindMapNode {
    pub id: String,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MindMapEdge {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// Search filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub domain: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub authors: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub journals: Option<Vec<String>>,
}

impl SearchFilters {
    pub fn year_from(&self) -> Option<i32> {
        self.start_date.map(|d| d.year())
    }

    pub fn year_to(&self) -> Option<i32> {
        self.end_date.map(|d| d.year())
    }

    /// Filters a remote service cannot apply: year range, author, journal and
    /// keyword constraints. An empty list counts as "no constraint".
    pub fn matches(&self, paper: &Paper) -> bool {
        if self.year_from().is_some_and(|y| paper.year < y) {
            return false;
        }
        if self.year_to().is_some_and(|y| paper.year > y) {
            return false;
        }
        if let Some(wanted) = self.authors.as_ref().filter(|v| !v.is_empty()) {
            let hit = paper.authors.iter().any(|a| {
                let a = a.to_lowercase();
                wanted.iter().any(|w| a.contains(&w.to_lowercase()))
            });
            if !hit {
                return false;
            }
        }
        if let Some(journals) = self.journals.as_ref().filter(|v| !v.is_empty()) {
            let journal = paper.journal.as_deref().unwrap_or("").to_lowercase();
            if !journals.iter().any(|j| journal.contains(&j.to_lowercase())) {
                return false;
            }
        }
        if let Some(keywords) = self.keywords.as_ref().filter(|v| !v.is_empty()) {
            let text = paper.searchable_text().to_lowercase();
            if !keywords.iter().any(|k| text.contains(&k.to_lowercase())) {
                return false;
            }
        }
        true
    }
}
