//! Audit event types for Custodia.
//!
//! Every change to the processing activity register produces an
//! [`AuditEvent`] that is handed to the capture pipeline.

mod action;
mod actor;
mod category;
mod event;
mod severity;

pub use action::AuditAction;
pub use actor::AuditActor;
pub use category::AuditCategory;
pub use event::{AuditEvent, AuditEventBuilder, AuditOutcome, AuditTarget};
pub use custodia_common_core::AuditEventId;
pub use severity::AuditSeverity;
