//! Synchronous event fan-out with per-listener fault isolation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

use super::event::ContextEvent;
use super::listener::EventListener;
use crate::errors::ListenerError;

/// Fans events out to an ordered set of listeners.
///
/// Delivery is synchronous and in registration order. A listener that
/// fails (error return or panic) is isolated: its failure is collected and
/// reported after the fan-out completes, and the remaining listeners still
/// receive the event.
#[derive(Default)]
pub struct EventPublisher {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventPublisher {
    /// Creates a publisher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener to the end of the delivery order.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Delivers `event` to every listener, in order.
    ///
    /// Returns the collected failures; an empty vector means full delivery.
    pub fn publish(&self, event: &ContextEvent) -> Vec<ListenerError> {
        let mut failures = Vec::new();
        for listener in &self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(listener = listener.name(), error = %err, "event listener failed");
                    failures.push(err);
                }
                Err(panic) => {
                    let err = ListenerError::new(listener.name(), panic_message(panic.as_ref()));
                    warn!(listener = listener.name(), error = %err, "event listener panicked");
                    failures.push(err);
                }
            }
        }
        failures
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::listener::CollectingEventListener;
    use crate::context::ContextSlot;
    use crate::testing::{FailingListener, PanickingListener};

    fn attach_event() -> ContextEvent {
        ContextEvent::attached(ContextSlot::new(), ContextSlot::for_span("t", "s"))
    }

    #[test]
    fn test_publish_with_no_listeners() {
        let publisher = EventPublisher::new();
        assert!(publisher.publish(&attach_event()).is_empty());
    }

    #[test]
    fn test_publish_delivers_in_order() {
        let first = Arc::new(CollectingEventListener::new());
        let second = Arc::new(CollectingEventListener::new());
        let publisher = EventPublisher::new()
            .with_listener(Arc::clone(&first) as Arc<dyn EventListener>)
            .with_listener(Arc::clone(&second) as Arc<dyn EventListener>);

        let failures = publisher.publish(&attach_event());
        assert!(failures.is_empty());
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_failing_listener_does_not_block_delivery() {
        let collector = Arc::new(CollectingEventListener::new());
        let publisher = EventPublisher::new()
            .with_listener(Arc::new(FailingListener::new("broken pipe")))
            .with_listener(Arc::clone(&collector) as Arc<dyn EventListener>);

        let failures = publisher.publish(&attach_event());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("broken pipe"));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let collector = Arc::new(CollectingEventListener::new());
        let publisher = EventPublisher::new()
            .with_listener(Arc::new(PanickingListener))
            .with_listener(Arc::clone(&collector) as Arc<dyn EventListener>);

        let failures = publisher.publish(&attach_event());
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("panicked"));
        assert_eq!(collector.len(), 1);
    }
}
