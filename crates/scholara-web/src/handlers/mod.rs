//! HTTP handlers for the JSON API.

pub mod error;
pub mod papers;
pub mod analysis;
pub mod claims;
pub mod funding;
pub mod search;
pub mod status;

pub use error::ApiError;
