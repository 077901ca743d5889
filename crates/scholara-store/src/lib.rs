//! scholara-store: The research entity store and the operations over it.
//! - `store`: papers, hypotheses, claims, funding and the current selection
//! - `service`: the operation layer (status, stale-response handling, events)
//! - `funding`, `graph`: derived data computed from entities

pub mod store;
pub mod status;
pub mod epoch;
pub mod events;
pub mod funding;
pub mod graph;
pub mod service;

pub use events::ResearchEvent;
pub use funding::{FundingMatcher, FundingQuery};
pub use service::{OperationResult, ResearchService};
pub use status::{
    FailureCause, OperationError, OperationKey, OperationKind, OperationOutcome, OperationStatus,
    StatusEntry, DEFAULT_STATUS_CAPACITY,
};
pub use store::{EntityStore, StoreError, StoreSnapshot};
