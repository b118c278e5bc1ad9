//! Error types for spchat

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the spchat system
///
/// The variants mirror the phases of a session: `Authentication` and
/// `Network` belong to the connect phase, `Indexing` and `VectorStore` to
/// the index-build phase, `Generation` to the chat phase.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Indexing error: {0}")]
    Indexing(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether re-triggering the failed action could plausibly succeed.
    ///
    /// Transient network and provider failures are retryable; bad
    /// credentials or configuration are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout(_) | Error::Generation(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
