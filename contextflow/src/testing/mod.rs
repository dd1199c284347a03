//! Testing utilities.
//!
//! This module provides:
//! - Misbehaving listeners for fault-isolation tests
//! - A storage fixture pre-wired with a collecting listener
//! - Opt-in log output for test runs

mod listeners;

pub use listeners::{FailingListener, PanickingListener};

use std::sync::Arc;

use crate::events::{
    CollectingEventListener, EventListener, EventPublisher, EventPublishingWrapper,
};
use crate::storage::ContextStorage;

/// Creates a fresh storage with a collecting listener already wired in.
///
/// The storage is not yet frozen; further wrappers can still be registered
/// before first use.
#[must_use]
pub fn storage_with_collector() -> (ContextStorage, Arc<CollectingEventListener>) {
    let storage = ContextStorage::new();
    let collector = Arc::new(CollectingEventListener::new());
    let publisher = Arc::new(
        EventPublisher::new().with_listener(Arc::clone(&collector) as Arc<dyn EventListener>),
    );
    let result = storage.register_wrapper(Arc::new(EventPublishingWrapper::new(publisher)));
    assert!(result.is_accepted(), "fresh storage rejected a registration");
    (storage, collector)
}

/// Initializes tracing output for tests, honoring `RUST_LOG`.
///
/// Safe to call from multiple tests; only the first call installs the
/// subscriber.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
