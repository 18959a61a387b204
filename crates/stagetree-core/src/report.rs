//! Failure reporting for filesystem operations.
//!
//! Operations never abort the host on failure; they return an error and hand
//! a human-readable message to a [`Reporter`] supplied at construction.

use std::sync::{Arc, Mutex, PoisonError};

/// Receives error-level messages for operations that did not succeed.
pub trait Reporter: Send + Sync {
    /// Report a failed operation.
    fn error(&self, message: &str);
}

/// Forwards reports to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn error(&self, message: &str) {
        tracing::error!(target: "stagetree", "{}", message);
    }
}

/// Records reports in memory.
///
/// Clones share the same buffer, so a clone can be handed to an operation
/// while the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CapturingReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CapturingReporter {
    /// Create an empty capturing reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages reported so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Forget all recorded messages.
    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Reporter for CapturingReporter {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capturing_reporter_shares_buffer() {
        let reporter = CapturingReporter::new();
        let handle = reporter.clone();
        handle.error("first");
        handle.error("second");

        assert_eq!(reporter.messages(), vec!["first", "second"]);
        reporter.clear();
        assert!(handle.is_empty());
    }
}
