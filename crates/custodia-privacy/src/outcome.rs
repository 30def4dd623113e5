//! Front-end result envelope.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Result of a register operation as presented to a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome<T = ()> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> OperationOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for OperationOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_ok() {
        let outcome: OperationOutcome<u32> = Ok::<_, String>(3).into();
        assert!(outcome.success);
        assert_eq!(outcome.data, Some(3));
        assert_eq!(serde_json::to_value(&outcome).unwrap(), json!({"success": true, "data": 3}));
    }

    #[test]
    fn test_from_err_unit() {
        let outcome: OperationOutcome = Err::<(), _>("nothing to update").into();
        assert!(!outcome.success);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "error": "nothing to update"})
        );
    }
}
