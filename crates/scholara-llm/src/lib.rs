//! scholara-llm: Language-model adapters.
//!
//! `backend` talks to the providers, `router` picks a backend per task and
//! audits every call, `prompt` and `parse` define the request/response
//! contract, and `analyst` ties them into the three research tasks.

pub mod backend;
pub mod router;
pub mod audit;
pub mod prompt;
pub mod parse;
pub mod analyst;

pub use analyst::{AnalysisError, Analyst, AnalystOptions};
pub use router::{LlmRouter, LlmTask};
