//! scholara-web: HTTP API for Scholara
//! Provides:
//!   - Paper upload, DOI import and literature search
//!   - Summaries, hypotheses and claim verification
//!   - Funding matches
//!   - Per-operation status, LLM audit log and an SSE event stream

pub mod config;
pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
