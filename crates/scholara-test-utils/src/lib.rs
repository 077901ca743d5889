//! Shared fixtures for Scholara tests: a scripted LLM backend, an in-memory
//! literature source, and sample entities.

pub mod backend;
pub mod fixtures;
pub mod source;

pub use backend::ScriptedBackend;
pub use pretty_assertions;
pub use source::InMemorySource;
