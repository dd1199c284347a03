//! Misbehaving listeners for fault-isolation tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ListenerError;
use crate::events::{ContextEvent, EventListener};

/// A listener that fails on every event.
#[derive(Debug, Default)]
pub struct FailingListener {
    message: String,
    calls: AtomicUsize,
}

impl FailingListener {
    /// Creates a listener failing with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of events this listener has received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EventListener for FailingListener {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_event(&self, _event: &ContextEvent) -> Result<(), ListenerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ListenerError::new("failing", self.message.clone()))
    }
}

/// A listener that panics on every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingListener;

impl EventListener for PanickingListener {
    fn name(&self) -> &str {
        "panicking"
    }

    fn on_event(&self, event: &ContextEvent) -> Result<(), ListenerError> {
        panic!("listener blew up handling {}", event.kind());
    }
}
