//! Error types for Custodia.

use thiserror::Error;

use crate::id::IdParseError;

/// The main error type for Custodia core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error with custom message.
    #[error("{0}")]
    Generic(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An identifier could not be parsed.
    #[error("invalid {kind} identifier '{value}': {source}")]
    InvalidId {
        kind: &'static str,
        value: String,
        #[source]
        source: IdParseError,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new generic error.
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using Custodia's Error.
pub type Result<T> = std::result::Result<T, Error>;
