//! CLI error handling and formatting.

use std::io;
use std::process::ExitCode;

use custodia_backend::BackendError;
use custodia_privacy::StoreError;
use thiserror::Error;

pub mod formatter;

pub use formatter::ErrorFormatter;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<std::path::PathBuf>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        resource_type: String,
        resource_name: String,
    },

    #[error("{message}")]
    Transition { message: String },

    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    Export {
        message: String,
        #[source]
        source: custodia_export::ExportError,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E004",
            Self::NotFound { .. } => "E005",
            Self::Transition { .. } => "E006",
            Self::Backend { .. } => "E008",
            Self::Export { .. } => "E009",
            Self::User { .. } => "E010",
            Self::Other(_) => "E999",
        }
    }

    /// Numeric exit status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::NotFound { .. } => 6,
            Self::Transition { .. } => 7,
            Self::Backend { .. } => 9,
            Self::Export { .. } => 10,
            Self::User { .. } | Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::User { hint, .. } => hint.as_deref(),
            Self::NotFound { .. } => Some("Run `custodia activity list` to see registered activities"),
            _ => None,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a config error with hint
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(
        message: impl Into<String>,
        source: io::Error,
        path: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self::NotFound {
            message: format!("{resource_type} not found: {resource_name}"),
            resource_type,
            resource_name,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

// Conversion implementations
impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

impl From<custodia_common_config::ConfigError> for CliError {
    fn from(err: custodia_common_config::ConfigError) -> Self {
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check .custodia/config.yaml".to_string()),
        }
    }
}

impl From<custodia_common_config::EnvError> for CliError {
    fn from(err: custodia_common_config::EnvError) -> Self {
        Self::Config {
            message: err.to_string(),
            source: Some(Box::new(err)),
            hint: Some("Check the CUSTODIA_* environment variables".to_string()),
        }
    }
}

impl From<custodia_export::ExportError> for CliError {
    fn from(err: custodia_export::ExportError) -> Self {
        Self::Export {
            message: format!("Export failed: {err}"),
            source: err,
        }
    }
}

impl From<BackendError> for CliError {
    fn from(err: BackendError) -> Self {
        Self::Backend {
            message: format!("Data backend error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => Self::Validation {
                message,
                field: None,
            },
            StoreError::NotFound(id) => Self::not_found("processing activity", id.to_string()),
            StoreError::InvalidTransition(e) => Self::Transition {
                message: e.to_string(),
            },
            StoreError::Backend(e) => e.into(),
            StoreError::Serialization(e) => Self::Backend {
                message: format!("Stored record could not be decoded: {e}"),
                source: Some(Box::new(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_common_core::ActivityId;
    use custodia_privacy::{ActivityStatus, InvalidTransition};

    #[test]
    fn test_store_errors_map_to_distinct_statuses() {
        let not_found: CliError = StoreError::NotFound(ActivityId::new()).into();
        assert_eq!(not_found.exit_status(), 6);
        assert!(not_found.hint().is_some());

        let invalid: CliError = StoreError::Validation("name is required".into()).into();
        assert_eq!(invalid.exit_status(), 5);
        assert_eq!(invalid.to_string(), "name is required");

        let transition: CliError = StoreError::InvalidTransition(InvalidTransition::NotAllowed {
            from: ActivityStatus::Active,
            action: "reactivate".into(),
        })
        .into();
        assert_eq!(transition.exit_status(), 7);
        assert_eq!(transition.code(), "E006");

        let backend: CliError =
            StoreError::Backend(BackendError::Unavailable("offline".into())).into();
        assert_eq!(backend.exit_status(), 9);
    }
}
