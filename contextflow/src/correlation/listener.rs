//! Listener that mirrors slot transitions into the correlation store.

use crate::context::ContextSlot;
use crate::errors::ListenerError;
use crate::events::{ContextEvent, EventListener};

/// Keeps the calling thread's correlation store in sync with the current
/// slot.
///
/// On attach, the flattened entries of the new slot are written to the
/// store. On detach, the detached slot's keys are removed and the restored
/// slot's entries reinstated. Keys the application set directly are only
/// touched when a slot carries the same key.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationListener;

impl CorrelationListener {
    /// Creates a new correlation listener.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn write_slot(slot: &ContextSlot) {
        for (key, value) in slot.to_dict() {
            super::insert(key, stringify(&value));
        }
    }
}

impl EventListener for CorrelationListener {
    fn name(&self) -> &str {
        "correlation"
    }

    fn on_event(&self, event: &ContextEvent) -> Result<(), ListenerError> {
        match event {
            ContextEvent::Attached { next, .. } => Self::write_slot(next),
            ContextEvent::Detached {
                detached, restored, ..
            } => {
                for key in detached.to_dict().keys() {
                    super::remove(key);
                }
                Self::write_slot(restored);
            }
        }
        Ok(())
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
