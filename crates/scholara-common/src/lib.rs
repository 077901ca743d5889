//! scholara-common: Shared types, errors, and helpers used across all Scholara crates.

pub mod error;
pub mod entities;
pub mod confidence;
pub mod ids;
pub mod sandbox;
pub mod seed;

// Re-export commonly used types
pub use entities::{
    Claim, Evidence, FundingOpportunity, Hypothesis, Paper, PaperDraft, SearchFilters,
    VerificationStatus,
};
pub use error::ScholaraError;
pub use ids::IdGenerator;
