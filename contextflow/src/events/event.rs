//! Context transition events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::ContextSlot;
use crate::utils::iso_timestamp;

/// An event describing one slot transition on a strand.
///
/// Events carry owned slot snapshots so listeners can retain them freely
/// and the event stays serializable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextEvent {
    /// A slot became current.
    Attached {
        /// The slot that was current before the attach.
        previous: ContextSlot,
        /// The newly current slot.
        next: ContextSlot,
        /// When the transition happened (RFC3339).
        timestamp: String,
    },
    /// A scope was released and the prior slot restored.
    Detached {
        /// The slot that was current until the release.
        detached: ContextSlot,
        /// The slot restored as current.
        restored: ContextSlot,
        /// When the transition happened (RFC3339).
        timestamp: String,
    },
}

impl ContextEvent {
    /// Creates an attach event for the transition `(previous, next)`.
    #[must_use]
    pub fn attached(previous: ContextSlot, next: ContextSlot) -> Self {
        Self::Attached {
            previous,
            next,
            timestamp: iso_timestamp(),
        }
    }

    /// Creates a detach event for the transition `(detached, restored)`.
    #[must_use]
    pub fn detached(detached: ContextSlot, restored: ContextSlot) -> Self {
        Self::Detached {
            detached,
            restored,
            timestamp: iso_timestamp(),
        }
    }

    /// The event kind string (e.g. "scope.attached").
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attached { .. } => "scope.attached",
            Self::Detached { .. } => "scope.detached",
        }
    }

    /// When the transition happened.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        match self {
            Self::Attached { timestamp, .. } | Self::Detached { timestamp, .. } => timestamp,
        }
    }

    /// The slot that is current after this transition.
    #[must_use]
    pub fn current_after(&self) -> &ContextSlot {
        match self {
            Self::Attached { next, .. } => next,
            Self::Detached { restored, .. } => restored,
        }
    }

    /// Converts the event to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("timestamp".to_string(), serde_json::json!(self.timestamp()));
        match self {
            Self::Attached { previous, next, .. } => {
                map.insert("previous".to_string(), serde_json::json!(previous.to_dict()));
                map.insert("next".to_string(), serde_json::json!(next.to_dict()));
            }
            Self::Detached {
                detached, restored, ..
            } => {
                map.insert("detached".to_string(), serde_json::json!(detached.to_dict()));
                map.insert("restored".to_string(), serde_json::json!(restored.to_dict()));
            }
        }
        map
    }
}
