//! Audit event actions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{AuditCategory, AuditSeverity};

/// Specific actions that can be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    // Session
    TenantSwitched,

    // Processing activities
    ActivityCreated,
    ActivityUpdated,
    ActivitySuspended,
    ActivityReactivated,
    ActivityApproved,
    ActivityRejected,
    ActivityValidated,

    // Privacy assessments
    ImpactAssessmentEvaluated,
    RegisterReportGenerated,

    // Data transfer
    DataExported,

    // System
    SystemError,

    // Custom action
    #[strum(default)]
    Custom(String),
}

impl AuditAction {
    /// Action name as persisted in the audit log.
    pub fn name(&self) -> String {
        match self {
            Self::Custom(name) => name.clone(),
            other => other.to_string(),
        }
    }

    /// Get the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            Self::ActivitySuspended
            | Self::ActivityRejected
            | Self::SystemError => AuditSeverity::High,

            Self::ActivityUpdated
            | Self::ActivityReactivated
            | Self::ActivityValidated
            | Self::TenantSwitched
            | Self::DataExported => AuditSeverity::Medium,

            Self::ActivityCreated | Self::ActivityApproved => AuditSeverity::Low,

            _ => AuditSeverity::Info,
        }
    }

    /// The category an action naturally belongs to.
    pub fn default_category(&self) -> AuditCategory {
        match self {
            Self::TenantSwitched => AuditCategory::Session,
            Self::ActivityCreated
            | Self::ActivityUpdated
            | Self::ActivitySuspended
            | Self::ActivityReactivated => AuditCategory::ProcessingActivity,
            Self::ActivityApproved | Self::ActivityRejected | Self::ActivityValidated => {
                AuditCategory::Compliance
            }
            Self::ImpactAssessmentEvaluated | Self::RegisterReportGenerated => {
                AuditCategory::Privacy
            }
            Self::DataExported => AuditCategory::DataTransfer,
            Self::SystemError | Self::Custom(_) => AuditCategory::System,
        }
    }
}
