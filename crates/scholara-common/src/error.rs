use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScholaraError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Security error: {0}")]
    SecurityError(String),
}
