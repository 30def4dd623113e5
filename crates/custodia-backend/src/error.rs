//! Backend errors.

use thiserror::Error;

/// Errors returned by a [`DataBackend`](crate::DataBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("procedure '{name}' failed: {message}")]
    Procedure { name: String, message: String },

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, BackendError>;
