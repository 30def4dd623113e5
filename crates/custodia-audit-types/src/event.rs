//! Core audit event type.

use crate::{AuditAction, AuditActor, AuditCategory, AuditEventId, AuditSeverity};
use chrono::{DateTime, Utc};
use custodia_common_core::{SessionContext, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: AuditEventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Tenant the event belongs to, when scoped.
    pub tenant_id: Option<TenantId>,
    /// Event category.
    pub category: AuditCategory,
    /// Specific action.
    pub action: AuditAction,
    /// Event severity.
    pub severity: AuditSeverity,
    /// Who initiated the event.
    pub actor: AuditActor,
    /// Optional target resource identifier.
    pub target: Option<AuditTarget>,
    /// Event outcome.
    pub outcome: AuditOutcome,
    /// Additional context data.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Correlation ID for related events.
    pub correlation_id: Option<String>,
}

/// Target of an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTarget {
    /// Type of the target resource.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional resource name.
    pub resource_name: Option<String>,
}

impl AuditTarget {
    /// Create a new target.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            resource_name: None,
        }
    }

    /// Target pointing at a processing activity record.
    pub fn activity(activity_id: impl ToString) -> Self {
        Self::new("processing_activity", activity_id.to_string())
    }

    /// Add a resource name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Action succeeded.
    #[default]
    Success,
    /// Action failed.
    Failure { reason: String },
    /// Action was denied.
    Denied { reason: String },
}

impl AuditOutcome {
    /// Check if the outcome is successful.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Check if the outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. } | Self::Denied { .. })
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { reason } | Self::Denied { reason } => Some(reason),
        }
    }
}

impl AuditEvent {
    /// Create a new event builder.
    pub fn builder(category: AuditCategory, action: AuditAction) -> AuditEventBuilder {
        AuditEventBuilder::new(category, action)
    }

    /// Builder using the action's default category.
    pub fn for_action(action: AuditAction) -> AuditEventBuilder {
        AuditEventBuilder::new(action.default_category(), action)
    }
}

/// Builder for constructing audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    category: AuditCategory,
    action: AuditAction,
    tenant_id: Option<TenantId>,
    severity: Option<AuditSeverity>,
    actor: Option<AuditActor>,
    target: Option<AuditTarget>,
    outcome: AuditOutcome,
    metadata: HashMap<String, serde_json::Value>,
    correlation_id: Option<String>,
}

impl AuditEventBuilder {
    /// Create a new builder.
    pub fn new(category: AuditCategory, action: AuditAction) -> Self {
        Self {
            category,
            action,
            tenant_id: None,
            severity: None,
            actor: None,
            target: None,
            outcome: AuditOutcome::Success,
            metadata: HashMap::new(),
            correlation_id: None,
        }
    }

    /// Scope the event to a tenant.
    pub fn tenant(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Set actor and tenant from a session.
    pub fn session(mut self, ctx: &SessionContext) -> Self {
        self.actor = Some(AuditActor::from_session(ctx));
        self.tenant_id = Some(ctx.effective_tenant());
        self
    }

    /// Set the severity (defaults to action's default severity).
    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the actor.
    pub fn actor(mut self, actor: AuditActor) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the target.
    pub fn target(mut self, target: AuditTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the outcome.
    pub fn outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Mark the event as failed.
    pub fn failure(self, reason: impl Into<String>) -> Self {
        self.outcome(AuditOutcome::Failure {
            reason: reason.into(),
        })
    }

    /// Add metadata.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), json);
        }
        self
    }

    /// Set correlation ID.
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Build the event.
    pub fn build(self) -> AuditEvent {
        let severity = match (&self.severity, &self.outcome) {
            (Some(severity), _) => *severity,
            (None, AuditOutcome::Success) => self.action.default_severity(),
            (None, _) => self.action.default_severity().max(AuditSeverity::Medium),
        };

        AuditEvent {
            id: AuditEventId::new(),
            timestamp: Utc::now(),
            tenant_id: self.tenant_id,
            category: self.category,
            severity,
            action: self.action,
            actor: self.actor.unwrap_or(AuditActor::Unknown),
            target: self.target,
            outcome: self.outcome,
            metadata: self.metadata,
            correlation_id: self.correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_common_core::UserId;

    #[test]
    fn test_builder_defaults() {
        let event = AuditEvent::for_action(AuditAction::ActivityCreated).build();

        assert_eq!(event.category, AuditCategory::ProcessingActivity);
        assert_eq!(event.severity, AuditSeverity::Low);
        assert_eq!(event.actor, AuditActor::Unknown);
        assert!(event.outcome.is_success());
        assert!(event.tenant_id.is_none());
    }

    #[test]
    fn test_builder_with_session() {
        let tenant = TenantId::new();
        let selected = TenantId::new();
        let ctx = SessionContext::new(UserId::new(), tenant)
            .as_platform_admin()
            .with_selected_tenant(selected);

        let event = AuditEvent::for_action(AuditAction::ActivityApproved)
            .session(&ctx)
            .target(AuditTarget::activity("act_1").with_name("Folha"))
            .metadata("notes", "ok")
            .build();

        assert_eq!(event.tenant_id, Some(selected));
        assert_eq!(event.target.as_ref().map(|t| t.resource_type.as_str()), Some("processing_activity"));
        assert_eq!(event.metadata.get("notes"), Some(&serde_json::json!("ok")));
    }

    #[test]
    fn test_failure_raises_severity() {
        let event = AuditEvent::for_action(AuditAction::ActivityCreated)
            .failure("backend unavailable")
            .build();

        assert!(event.outcome.is_failure());
        assert_eq!(event.outcome.reason(), Some("backend unavailable"));
        assert_eq!(event.severity, AuditSeverity::Medium);
    }

    #[test]
    fn test_event_json_shape() {
        let event = AuditEvent::for_action(AuditAction::ActivitySuspended)
            .failure("x")
            .build();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["action"], "activity_suspended");
        assert_eq!(json["outcome"]["status"], "failure");
        assert!(json.get("metadata").is_none());
    }
}
