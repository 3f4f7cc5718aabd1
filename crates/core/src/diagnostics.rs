//! Diagnostic message delivery for non-fatal discovery problems

use parking_lot::Mutex;

/// Receives messages about operational failures that do not stop discovery,
/// such as a builder that could not be constructed.
pub trait DiagnosticSink: Send + Sync {
    fn send(&self, message: &str);
}

/// Forwards diagnostics to `tracing` at warn level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn send(&self, message: &str) {
        tracing::warn!(target: "testscout::diagnostics", "{message}");
    }
}

/// Drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn send(&self, _message: &str) {}
}

/// Keeps every message in memory, in arrival order
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn send(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
