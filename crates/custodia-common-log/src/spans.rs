//! Distributed tracing utilities.

use std::future::Future;
use tracing::{info_span, Instrument, Span};

/// Create a span scoping work to one tenant.
pub fn tenant_span(tenant_id: &str, user_id: &str) -> Span {
    info_span!("tenant", tenant = %tenant_id, user = %user_id)
}

/// Create a span for a data backend call.
pub fn backend_span(table: &str, operation: &str) -> Span {
    info_span!("backend", table = %table, op = %operation)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %self.elapsed_ms(),
            "operation completed"
        );
    }
}

/// Re-export of tracing::instrument for convenience.
pub use tracing::instrument;
