//! Batch event collection for efficient persistence.

use crate::{AuditCapture, AuditSink, CaptureConfig, CapturedEvent};
use custodia_audit_types::AuditEvent;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Configuration for batch collection.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum events per batch.
    pub max_batch_size: usize,
    /// Maximum time to wait before flushing.
    pub max_batch_age: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 50,
            max_batch_age: Duration::from_millis(500),
        }
    }
}

/// Collected batch of events.
#[derive(Debug)]
pub struct EventBatch {
    pub events: Vec<CapturedEvent>,
    pub collected_at: Instant,
}

impl EventBatch {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            collected_at: Instant::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Unwrap the audit events, dropping capture metadata.
    pub fn into_events(self) -> Vec<AuditEvent> {
        self.events.into_iter().map(|c| c.event).collect()
    }
}

/// Batch collector that aggregates events.
pub struct BatchCollector {
    config: BatchConfig,
    current_batch: EventBatch,
}

impl BatchCollector {
    /// Create a new collector.
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            current_batch: EventBatch::new(),
        }
    }

    /// Add an event to the current batch.
    /// Returns Some(batch) if the batch is ready to flush.
    pub fn add(&mut self, event: CapturedEvent) -> Option<EventBatch> {
        if self.current_batch.is_empty() {
            self.current_batch.collected_at = Instant::now();
        }
        self.current_batch.events.push(event);

        if self.should_flush() {
            Some(self.take_batch())
        } else {
            None
        }
    }

    /// Check if current batch should be flushed.
    pub fn should_flush(&self) -> bool {
        self.current_batch.len() >= self.config.max_batch_size
            || self.current_batch.collected_at.elapsed() >= self.config.max_batch_age
    }

    /// Check if batch is due based on age alone.
    pub fn is_due(&self) -> bool {
        !self.current_batch.is_empty()
            && self.current_batch.collected_at.elapsed() >= self.config.max_batch_age
    }

    /// Take the current batch and reset.
    pub fn take_batch(&mut self) -> EventBatch {
        std::mem::replace(&mut self.current_batch, EventBatch::new())
    }

    /// Check if there are pending events.
    pub fn has_pending(&self) -> bool {
        !self.current_batch.is_empty()
    }
}

async fn flush(sink: &dyn AuditSink, batch: EventBatch, reason: &str) {
    let count = batch.len();
    debug!(count, reason, "Flushing audit batch");
    if let Err(e) = sink.persist(&batch.into_events()).await {
        warn!(count, error = %e, "Failed to persist audit batch");
    }
}

/// Drain captured events into a sink until every capture handle is dropped.
///
/// Persist failures are logged and the batch is discarded.
pub async fn persist_loop(
    mut receiver: mpsc::Receiver<CapturedEvent>,
    sink: Arc<dyn AuditSink>,
    config: BatchConfig,
) {
    let tick = (config.max_batch_age / 2).max(Duration::from_millis(1));
    let mut collector = BatchCollector::new(config);
    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Some(event) => {
                    if let Some(batch) = collector.add(event) {
                        flush(sink.as_ref(), batch, "size").await;
                    }
                }
                None => break,
            },
            _ = interval.tick() => {
                if collector.is_due() {
                    flush(sink.as_ref(), collector.take_batch(), "age").await;
                }
            }
        }
    }

    if collector.has_pending() {
        flush(sink.as_ref(), collector.take_batch(), "shutdown").await;
    }
}

/// Start a capture handle with a background task persisting to `sink`.
///
/// The task ends once all clones of the returned handle are dropped.
pub fn spawn_pipeline(
    capture: CaptureConfig,
    batch: BatchConfig,
    sink: Arc<dyn AuditSink>,
) -> (AuditCapture, JoinHandle<()>) {
    let (handle, receiver) = AuditCapture::new(capture);
    let task = tokio::spawn(persist_loop(receiver, sink, batch));
    (handle, task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySink, SinkError};
    use async_trait::async_trait;
    use custodia_audit_types::AuditAction;

    fn captured(action: AuditAction) -> CapturedEvent {
        CapturedEvent {
            event: AuditEvent::for_action(action).build(),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_collector_flushes_on_size() {
        let mut collector = BatchCollector::new(BatchConfig {
            max_batch_size: 2,
            max_batch_age: Duration::from_secs(60),
        });

        assert!(collector.add(captured(AuditAction::ActivityCreated)).is_none());
        let batch = collector.add(captured(AuditAction::ActivityUpdated)).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!collector.has_pending());
    }

    #[tokio::test]
    async fn test_pipeline_flushes_on_shutdown() {
        let sink = MemorySink::new();
        let (capture, task) = spawn_pipeline(
            CaptureConfig::default(),
            BatchConfig {
                max_batch_size: 100,
                max_batch_age: Duration::from_secs(60),
            },
            Arc::new(sink.clone()),
        );

        for _ in 0..3 {
            capture.record(capture.builder(AuditAction::ActivityCreated).build());
        }
        drop(capture);
        task.await.unwrap();

        assert_eq!(sink.len(), 3);
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn persist(&self, _events: &[AuditEvent]) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_loop() {
        let (capture, task) = spawn_pipeline(
            CaptureConfig::default(),
            BatchConfig {
                max_batch_size: 1,
                max_batch_age: Duration::from_secs(60),
            },
            Arc::new(FailingSink),
        );

        capture.record(capture.builder(AuditAction::ActivityCreated).build());
        capture.record(capture.builder(AuditAction::ActivityUpdated).build());
        drop(capture);

        assert!(task.await.is_ok());
    }
}
