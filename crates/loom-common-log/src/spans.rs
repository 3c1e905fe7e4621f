//! Span helpers for Loom operations.

use tracing::{info_span, Span};

/// Span covering one operation (`add`, `weave`, `remove`).
pub fn operation_span(operation: &str) -> Span {
    info_span!("op", name = %operation)
}

/// Span covering the processing of a single thread.
pub fn thread_span(thread: &str) -> Span {
    info_span!("thread", name = %thread)
}

/// Span for a file operation inside a project.
pub fn file_span(operation: &str, path: &str) -> Span {
    info_span!("file", op = %operation, path = %path)
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

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}
