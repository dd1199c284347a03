//! Per-thread correlation store for logging integration.
//!
//! The store is the logging-side counterpart of the context chain: a flat
//! string map the logging layer can read synchronously (trace and span
//! identifiers, baggage). It is populated by [`CorrelationListener`] from
//! slot transitions; entries set directly by the application are left
//! alone unless a slot carries the same key.

mod listener;

pub use listener::CorrelationListener;

use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static CORRELATION: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
}

/// Returns the value for `key` on the calling thread.
#[must_use]
pub fn get(key: &str) -> Option<String> {
    CORRELATION.with(|map| map.borrow().get(key).cloned())
}

/// Sets `key` to `value` on the calling thread.
pub fn insert(key: impl Into<String>, value: impl Into<String>) {
    CORRELATION.with(|map| {
        map.borrow_mut().insert(key.into(), value.into());
    });
}

/// Removes `key` on the calling thread, returning the prior value.
pub fn remove(key: &str) -> Option<String> {
    CORRELATION.with(|map| map.borrow_mut().remove(key))
}

/// Clears the calling thread's store.
pub fn clear() {
    CORRELATION.with(|map| map.borrow_mut().clear());
}

/// Returns a copy of the calling thread's store.
#[must_use]
pub fn snapshot() -> HashMap<String, String> {
    CORRELATION.with(|map| map.borrow().clone())
}
