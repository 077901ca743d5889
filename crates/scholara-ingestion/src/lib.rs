//! scholara-ingestion: Literature adapters.
//! - Paper discovery and DOI resolution (CORE, CrossRef)
//! - Full-text retrieval
//! - Deduplication
//! - Local ranking of held papers

pub mod sources;
pub mod dedup;
pub mod models;
pub mod library;

pub use library::{search_local, LibraryOptions, ResearchLibrary};
pub use models::PaperMetadata;
pub use sources::LiteratureSource;
