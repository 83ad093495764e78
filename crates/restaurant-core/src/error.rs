//! Error types for restaurant-core

use thiserror::Error;

/// Result type alias using restaurant-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in restaurant-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request rejected by the transport or answered with a non-2xx status
    #[error("Network error: {0}")]
    Network(String),

    /// Worker lifecycle transition that is not allowed from the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl Error {
    /// Whether this error should be treated as a cache-fallback signal
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
