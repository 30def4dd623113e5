//! Destinations for captured audit events.

use async_trait::async_trait;
use custodia_audit_types::AuditEvent;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by an audit sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to persist audit events: {0}")]
    Persist(String),
}

/// A place where audit batches are written.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist a batch of events.
    async fn persist(&self, events: &[AuditEvent]) -> Result<(), SinkError>;
}

/// Sink keeping events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn persist(&self, events: &[AuditEvent]) -> Result<(), SinkError> {
        self.events.lock().extend_from_slice(events);
        Ok(())
    }
}
