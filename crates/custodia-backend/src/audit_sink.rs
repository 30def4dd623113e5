//! Audit persistence into a backend table.

use crate::{DataBackend, Row};
use async_trait::async_trait;
use custodia_audit_capture::{AuditSink, SinkError};
use custodia_audit_types::{AuditActor, AuditEvent};
use serde_json::{json, Value};

/// Table receiving audit events.
pub const AUDIT_TABLE: &str = "audit_logs";

/// Writes audit batches into [`AUDIT_TABLE`].
#[derive(Debug, Clone)]
pub struct BackendAuditSink<B> {
    backend: B,
}

impl<B: DataBackend> BackendAuditSink<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

fn event_row(event: &AuditEvent) -> Row {
    let (actor_type, actor_id) = match &event.actor {
        AuditActor::User { user_id, .. } => ("user", Some(user_id.to_storage())),
        AuditActor::System { component } => ("system", Some(component.clone())),
        AuditActor::Unknown => ("unknown", None),
    };

    let row = json!({
        "id": event.id.to_storage(),
        "tenant_id": event.tenant_id.map(|t| t.to_storage()),
        "created_at": event.timestamp.to_rfc3339(),
        "category": event.category.to_string(),
        "action": event.action.name(),
        "severity": event.severity.to_string(),
        "actor_type": actor_type,
        "actor_id": actor_id,
        "resource_type": event.target.as_ref().map(|t| t.resource_type.clone()),
        "resource_id": event.target.as_ref().map(|t| t.resource_id.clone()),
        "success": event.outcome.is_success(),
        "extended_retention": event.category.requires_extended_retention(),
        "error": event.outcome.reason(),
        "metadata": event.metadata,
        "correlation_id": event.correlation_id,
    });

    match row {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

#[async_trait]
impl<B: DataBackend> AuditSink for BackendAuditSink<B> {
    async fn persist(&self, events: &[AuditEvent]) -> Result<(), SinkError> {
        if events.is_empty() {
            return Ok(());
        }
        let rows = events.iter().map(event_row).collect();
        self.backend
            .insert(AUDIT_TABLE, rows)
            .await
            .map(|_| ())
            .map_err(|e| SinkError::Persist(e.to_string()))
    }
}
