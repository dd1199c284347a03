//! Immutable context slots forming the attachment chain.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::utils::generate_id;

/// Conventional key for the trace identifier.
pub const TRACE_ID_FIELD: &str = "trace_id";

/// Conventional key for the span identifier.
pub const SPAN_ID_FIELD: &str = "span_id";

/// An immutable snapshot of contextual key/value state.
///
/// Slots are never mutated: write operations produce a new slot containing
/// the original values plus the new ones. When a slot is attached, the
/// storage links it to the slot that was current at that moment, forming a
/// parent chain that mirrors scope nesting.
///
/// Value lookup consults the slot's own data first, then walks the parent
/// chain, so ambient state accumulates across nested activations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextSlot {
    /// The slot's own key/value entries.
    #[serde(default)]
    data: HashMap<String, serde_json::Value>,

    /// The slot that was current when this one was attached.
    #[serde(skip)]
    parent: Option<Arc<ContextSlot>>,
}

impl ContextSlot {
    /// Creates an empty slot with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot carrying the conventional trace/span fields.
    #[must_use]
    pub fn for_span(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self::new()
            .with_value(TRACE_ID_FIELD, serde_json::json!(trace_id.into()))
            .with_value(SPAN_ID_FIELD, serde_json::json!(span_id.into()))
    }

    /// Creates a slot with freshly generated trace/span identifiers.
    #[must_use]
    pub fn new_span() -> Self {
        Self::for_span(generate_id(), generate_id())
    }

    /// Returns a copy of this slot with the given value added.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Returns a copy of this slot linked to the given parent.
    ///
    /// The storage calls this at attach time; any prior parent link is
    /// replaced by the slot that is actually being superseded.
    #[must_use]
    pub fn with_parent(mut self, parent: Arc<ContextSlot>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the value for `key`, consulting this slot's own data first
    /// and then the parent chain.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        match self.data.get(key) {
            Some(value) => Some(value),
            None => self.parent.as_deref().and_then(|p| p.get(key)),
        }
    }

    /// Returns the slot's own entries, excluding inherited ones.
    #[must_use]
    pub fn own_data(&self) -> &HashMap<String, serde_json::Value> {
        &self.data
    }

    /// Returns the previously active slot, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ContextSlot>> {
        self.parent.as_ref()
    }

    /// Returns true when the slot carries no data and has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.data.is_empty() && self.parent.is_none()
    }

    /// Converts to a flattened dictionary representation.
    ///
    /// Entries from nearer slots override entries inherited from the chain.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = match self.parent.as_deref() {
            Some(parent) => parent.to_dict(),
            None => HashMap::new(),
        };
        for (k, v) in &self.data {
            map.insert(k.clone(), v.clone());
        }
        map
    }

    /// Returns the trace identifier, if present anywhere in the chain.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.get(TRACE_ID_FIELD).and_then(serde_json::Value::as_str)
    }

    /// Returns the span identifier, if present anywhere in the chain.
    #[must_use]
    pub fn span_id(&self) -> Option<&str> {
        self.get(SPAN_ID_FIELD).and_then(serde_json::Value::as_str)
    }
}
