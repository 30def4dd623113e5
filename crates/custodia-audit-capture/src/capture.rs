//! Audit event capture mechanism.

use custodia_audit_types::{AuditAction, AuditActor, AuditEvent, AuditEventBuilder};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

/// Configuration for audit capture.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum events to buffer before new events are dropped.
    pub buffer_size: usize,
    /// Default actor if none specified.
    pub default_actor: Option<AuditActor>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1_000,
            default_actor: None,
        }
    }
}

/// Handle for submitting audit events.
///
/// Recording never blocks the caller and never fails the operation being
/// audited. A disabled handle silently discards events.
#[derive(Clone)]
pub struct AuditCapture {
    sender: Option<mpsc::Sender<CapturedEvent>>,
    config: Arc<CaptureConfig>,
}

/// Internal captured event with metadata.
#[derive(Debug)]
pub struct CapturedEvent {
    pub event: AuditEvent,
    pub captured_at: std::time::Instant,
}

impl AuditCapture {
    /// Create a new capture handle.
    pub fn new(config: CaptureConfig) -> (Self, mpsc::Receiver<CapturedEvent>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let capture = Self {
            sender: Some(sender),
            config: Arc::new(config),
        };
        (capture, receiver)
    }

    /// A handle that drops every event.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            config: Arc::new(CaptureConfig::default()),
        }
    }

    /// Record an audit event (non-blocking).
    pub fn record(&self, event: AuditEvent) {
        let Some(sender) = &self.sender else {
            trace!(action = %event.action, "Audit disabled, event discarded");
            return;
        };

        let action = event.action.name();
        let captured = CapturedEvent {
            event,
            captured_at: std::time::Instant::now(),
        };

        match sender.try_send(captured) {
            Ok(()) => debug!(%action, "Audit event captured"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%action, "Audit buffer full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(%action, "Audit channel closed");
            }
        }
    }

    /// Create a builder with the default actor.
    pub fn builder(&self, action: AuditAction) -> AuditEventBuilder {
        let mut builder = AuditEvent::for_action(action);
        if let Some(actor) = &self.config.default_actor {
            builder = builder.actor(actor.clone());
        }
        builder
    }

    /// Check if the capture channel is healthy.
    pub fn is_healthy(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Check whether events are being collected at all.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }
}
