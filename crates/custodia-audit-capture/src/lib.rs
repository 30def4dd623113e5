//! Audit event capture pipeline for Custodia.
//!
//! Register operations hand events to an [`AuditCapture`] without waiting.
//! A background [`persist_loop`] groups them into batches and writes them
//! to an [`AuditSink`]. Failures along the way are logged and never reach
//! the caller.

mod batch;
mod capture;
mod sink;

pub use batch::{persist_loop, spawn_pipeline, BatchCollector, BatchConfig, EventBatch};
pub use capture::{AuditCapture, CaptureConfig, CapturedEvent};
pub use sink::{AuditSink, MemorySink, SinkError};

// Re-export types for convenience
pub use custodia_audit_types::{
    AuditAction, AuditActor, AuditCategory, AuditEvent, AuditEventBuilder, AuditOutcome,
    AuditSeverity, AuditTarget,
};
