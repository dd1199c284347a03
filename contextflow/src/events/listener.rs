//! Event listener trait and implementations.

use tracing::{debug, info, Level};

use super::event::ContextEvent;
use crate::errors::ListenerError;

/// Trait for listeners that receive slot transition events.
///
/// Listeners run synchronously on the strand performing the transition, so
/// handlers must be fast and non-blocking. A failing listener never affects
/// delivery to the others.
pub trait EventListener: Send + Sync {
    /// Name used in failure diagnostics.
    fn name(&self) -> &str {
        "listener"
    }

    /// Handles one transition event.
    fn on_event(&self, event: &ContextEvent) -> Result<(), ListenerError>;
}

/// A no-op listener that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventListener;

impl EventListener for NoOpEventListener {
    fn name(&self) -> &str {
        "noop"
    }

    fn on_event(&self, _event: &ContextEvent) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// A listener that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingEventListener {
    /// The log level to use.
    level: Level,
}

impl Default for LoggingEventListener {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventListener {
    /// Creates a new logging listener with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging listener.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl EventListener for LoggingEventListener {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_event(&self, event: &ContextEvent) -> Result<(), ListenerError> {
        let data = event.to_dict();
        match self.level {
            Level::DEBUG => debug!(event_kind = %event.kind(), event_data = ?data, "Context event"),
            _ => info!(event_kind = %event.kind(), event_data = ?data, "Context event"),
        }
        Ok(())
    }
}

/// A collecting listener for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventListener {
    events: parking_lot::RwLock<Vec<ContextEvent>>,
}

impl CollectingEventListener {
    /// Creates a new collecting listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<ContextEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events of the given kind.
    #[must_use]
    pub fn events_of_kind(&self, kind: &str) -> Vec<ContextEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }
}

impl EventListener for CollectingEventListener {
    fn name(&self) -> &str {
        "collecting"
    }

    fn on_event(&self, event: &ContextEvent) -> Result<(), ListenerError> {
        self.events.write().push(event.clone());
        Ok(())
    }
}
