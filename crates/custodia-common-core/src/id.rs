//! Strongly-typed identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A strongly-typed ID wrapper.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[doc = concat!("A unique identifier with prefix '", $prefix, "_'.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from string (with or without prefix).
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                let s = s.trim();
                let s = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat)
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// The bare UUID string, as stored by the data backend.
            pub fn to_storage(&self) -> String {
                self.0.to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

/// Error parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    /// The ID format is invalid.
    #[error("invalid ID format")]
    InvalidFormat,
}

define_id!(TenantId, "tnt");
define_id!(UserId, "usr");
define_id!(ActivityId, "act");
define_id!(AuditEventId, "aud");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_id_roundtrip() {
        let id = ActivityId::new();
        let s = id.to_string();
        let parsed = ActivityId::parse(&s).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_prefix() {
        assert!(TenantId::new().to_string().starts_with("tnt_"));
        assert!(UserId::new().to_string().starts_with("usr_"));
        assert!(ActivityId::new().to_string().starts_with("act_"));
        assert!(AuditEventId::new().to_string().starts_with("aud_"));
    }

    #[test]
    fn test_id_serializes_as_bare_uuid() {
        let id = ActivityId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let deserialized: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_id_parse_without_prefix() {
        let id = TenantId::new();
        let parsed = TenantId::parse(&id.to_storage()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_parse_rejects_garbage() {
        assert_eq!(UserId::parse("usr_not-a-uuid"), Err(IdParseError::InvalidFormat));
        assert_eq!(UserId::parse(""), Err(IdParseError::InvalidFormat));
    }
}
