use serde::Serialize;

use scholara_common::VerificationStatus;

use crate::status::{FailureCause, OperationKind};

/// Change notifications published after every applied operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    PaperAdded { paper_id: String, title: String },
    PapersMerged { added: usize, query: String },
    SummaryGenerated { paper_id: String, key_findings: usize },
    HypothesesGenerated { paper_id: String, hypothesis_ids: Vec<String> },
    ClaimAdded { claim_id: String, hypothesis_id: String },
    ClaimVerified { claim_id: String, status: VerificationStatus, confidence: f64 },
    FundingMatched { paper_id: String, matches: usize },
    CurrentPaperChanged { paper_id: Option<String> },
    OperationFailed { operation: OperationKind, message: &'static str, cause: FailureCause },
}
