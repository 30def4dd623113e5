//! Audit event categories.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// High-level category for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditCategory {
    /// Session changes such as a platform admin acting for another tenant.
    Session,
    /// Processing activity register changes.
    ProcessingActivity,
    /// Review and compliance validation decisions.
    Compliance,
    /// Impact assessments and register reports.
    Privacy,
    /// Data export events.
    DataTransfer,
    /// System errors.
    System,
}

impl AuditCategory {
    /// Get all categories.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// Check if this category requires elevated retention.
    ///
    /// Register changes, compliance decisions and tenant switches are kept
    /// as evidence for the supervisory authority.
    pub fn requires_extended_retention(&self) -> bool {
        matches!(
            self,
            Self::Session | Self::ProcessingActivity | Self::Compliance
        )
    }
}
