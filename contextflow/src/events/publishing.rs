//! The wrapper that wires event publishing into the storage chain.

use std::sync::Arc;
use tracing::debug;

use super::event::ContextEvent;
use super::publisher::EventPublisher;
use crate::context::ContextSlot;
use crate::storage::RawStorage;
use crate::wrappers::StorageWrapper;

/// Installs an [`EventPublisher`] as a storage decorator.
///
/// This wrapper is how listeners get wired into the storage: it must be
/// registered before the storage freezes. If the registration is rejected,
/// no events will ever fire, which is exactly why registration results
/// must be checked.
pub struct EventPublishingWrapper {
    publisher: Arc<EventPublisher>,
}

impl EventPublishingWrapper {
    /// Creates a wrapper publishing through `publisher`.
    #[must_use]
    pub fn new(publisher: Arc<EventPublisher>) -> Self {
        Self { publisher }
    }
}

impl StorageWrapper for EventPublishingWrapper {
    fn name(&self) -> &str {
        "event-publishing"
    }

    fn wrap(&self, inner: Arc<dyn RawStorage>) -> Arc<dyn RawStorage> {
        Arc::new(EventPublishingStorage {
            inner,
            publisher: Arc::clone(&self.publisher),
        })
    }
}

struct EventPublishingStorage {
    inner: Arc<dyn RawStorage>,
    publisher: Arc<EventPublisher>,
}

impl RawStorage for EventPublishingStorage {
    fn attach(&self, next: Arc<ContextSlot>) -> Arc<ContextSlot> {
        let previous = self.inner.attach(Arc::clone(&next));
        let event = ContextEvent::attached((*previous).clone(), (*next).clone());
        let failures = self.publisher.publish(&event);
        if !failures.is_empty() {
            debug!(failures = failures.len(), "attach fan-out completed with failures");
        }
        previous
    }

    fn detach(&self, restored: Arc<ContextSlot>) -> Arc<ContextSlot> {
        let detached = self.inner.detach(Arc::clone(&restored));
        let event = ContextEvent::detached((*detached).clone(), (*restored).clone());
        let failures = self.publisher.publish(&event);
        if !failures.is_empty() {
            debug!(failures = failures.len(), "detach fan-out completed with failures");
        }
        detached
    }

    fn current(&self) -> Arc<ContextSlot> {
        self.inner.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::listener::{CollectingEventListener, EventListener};
    use crate::storage::ContextStorage;

    #[test]
    fn test_wrapper_publishes_transitions() {
        let storage = ContextStorage::new();
        let collector = Arc::new(CollectingEventListener::new());
        let publisher = Arc::new(
            EventPublisher::new().with_listener(Arc::clone(&collector) as Arc<dyn EventListener>),
        );
        let result = storage.register_wrapper(Arc::new(EventPublishingWrapper::new(publisher)));
        assert!(result.is_accepted());

        let mut scope = storage.attach(ContextSlot::for_span("t1", "s1"));
        assert_eq!(collector.events_of_kind("scope.attached").len(), 1);

        scope.detach().unwrap();
        assert_eq!(collector.events_of_kind("scope.detached").len(), 1);

        match &collector.events()[0] {
            ContextEvent::Attached { previous, next, .. } => {
                assert!(previous.is_root());
                assert_eq!(next.trace_id(), Some("t1"));
            }
            other => panic!("expected attach event, got {other:?}"),
        }
    }

    #[test]
    fn test_current_does_not_publish() {
        let storage = ContextStorage::new();
        let collector = Arc::new(CollectingEventListener::new());
        let publisher = Arc::new(
            EventPublisher::new().with_listener(Arc::clone(&collector) as Arc<dyn EventListener>),
        );
        let result = storage.register_wrapper(Arc::new(EventPublishingWrapper::new(publisher)));
        assert!(result.is_accepted());

        let _ = storage.current();
        assert!(collector.is_empty());
    }
}
