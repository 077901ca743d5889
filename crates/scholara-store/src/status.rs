//! Per-operation status tracking.
//!
//! Each operation kind, keyed by the entity it works on, carries its own
//! status, so a failing verification never masks a running summary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    UploadPaper,
    AddPaperByDoi,
    GenerateSummary,
    GenerateHypothesis,
    AddClaim,
    VerifyClaim,
    FindFunding,
    SearchPapers,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::UploadPaper        => "upload_paper",
            OperationKind::AddPaperByDoi      => "add_paper_by_doi",
            OperationKind::GenerateSummary    => "generate_summary",
            OperationKind::GenerateHypothesis => "generate_hypothesis",
            OperationKind::AddClaim           => "add_claim",
            OperationKind::VerifyClaim        => "verify_claim",
            OperationKind::FindFunding        => "find_funding",
            OperationKind::SearchPapers       => "search_papers",
        }
    }

    /// The message shown to the user when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            OperationKind::UploadPaper        => "Failed to upload paper",
            OperationKind::AddPaperByDoi      => "Failed to add paper",
            OperationKind::GenerateSummary    => "Failed to generate summary",
            OperationKind::GenerateHypothesis => "Failed to generate hypothesis",
            OperationKind::AddClaim           => "Failed to add claim",
            OperationKind::VerifyClaim        => "Failed to verify claim",
            OperationKind::FindFunding        => "Failed to find funding opportunities",
            OperationKind::SearchPapers       => "Failed to search papers",
        }
    }
}

pub const PAPER_NOT_FOUND: &str = "Paper not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The language-model or literature service could not be reached or
    /// answered with an error.
    ServiceUnavailable,
    /// The model answered, but not in a shape the parser accepts.
    MalformedResponse,
    NotFound,
    /// The result would break referential integrity.
    Integrity,
}

/// What a caller gets back when an operation fails. `message` is the
/// static user-facing text; `detail` carries the underlying error.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct OperationError {
    pub kind: OperationKind,
    pub cause: FailureCause,
    pub message: &'static str,
    pub detail: String,
}

impl OperationError {
    pub fn new(kind: OperationKind, cause: FailureCause, detail: impl Into<String>) -> Self {
        let message = match (kind, cause) {
            (OperationKind::AddPaperByDoi, FailureCause::NotFound) => PAPER_NOT_FOUND,
            _ => kind.failure_message(),
        };
        Self { kind, cause, message, detail: detail.into() }
    }
}

/// Result of an operation that completed without error.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome<T> {
    Applied(T),
    /// A newer request for the same key started while this one was in
    /// flight; its result was discarded.
    Superseded,
}

impl<T> OperationOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            OperationOutcome::Applied(v) => Some(v),
            OperationOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, OperationOutcome::Superseded)
    }
}

/// An operation kind plus the entity it targets (paper id, claim id, DOI).
/// Collection-wide operations have no target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OperationKey {
    pub kind: OperationKind,
    pub target: Option<String>,
}

impl OperationKey {
    pub fn new(kind: OperationKind, target: impl Into<String>) -> Self {
        Self { kind, target: Some(target.into()) }
    }

    pub fn global(kind: OperationKind) -> Self {
        Self { kind, target: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OperationStatus {
    Idle,
    Loading { since: DateTime<Utc> },
    Succeeded { at: DateTime<Utc> },
    Failed {
        message: &'static str,
        cause: FailureCause,
        detail: String,
        at: DateTime<Utc>,
    },
}

impl OperationStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationStatus::Loading { .. })
    }

    pub fn failed(err: &OperationError) -> Self {
        OperationStatus::Failed {
            message: err.message,
            cause: err.cause,
            detail: err.detail.clone(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub operation: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(flatten)]
    pub status: OperationStatus,
}

/// Finished entries kept on the board before the oldest are dropped.
pub const DEFAULT_STATUS_CAPACITY: usize = 256;

/// Status per operation key. Loading entries are always kept; finished ones
/// are capped, oldest first.
#[derive(Debug)]
pub struct StatusBoard {
    entries: HashMap<OperationKey, (u64, OperationStatus)>,
    seq: u64,
    capacity: usize,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STATUS_CAPACITY)
    }
}

impl StatusBoard {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::new(), seq: 0, capacity }
    }

    pub fn set(&mut self, key: OperationKey, status: OperationStatus) {
        self.seq += 1;
        let finished = !status.is_loading();
        self.entries.insert(key, (self.seq, status));
        if finished {
            self.prune();
        }
    }

    pub fn get(&self, key: &OperationKey) -> OperationStatus {
        self.entries.get(key).map(|(_, s)| s.clone()).unwrap_or(OperationStatus::Idle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prune(&mut self) {
        let mut finished: Vec<(u64, OperationKey)> = self
            .entries
            .iter()
            .filter(|(_, (_, s))| !s.is_loading())
            .map(|(k, (seq, _))| (*seq, k.clone()))
            .collect();
        if finished.len() <= self.capacity {
            return;
        }
        finished.sort();
        let excess = finished.len() - self.capacity;
        for (_, key) in finished.into_iter().take(excess) {
            self.entries.remove(&key);
        }
    }

    /// All tracked statuses, ordered by operation then target.
    pub fn entries(&self) -> Vec<StatusEntry> {
        let mut keys: Vec<&OperationKey> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|k| StatusEntry {
                operation: k.kind,
                target: k.target.clone(),
                status: self.get(k),
            })
            .collect()
    }
}
