//! Context slot model.
//!
//! This module provides:
//! - Immutable context slots carrying key/value state
//! - The parent chain linking each slot to the previously active one

mod slot;

pub use slot::{ContextSlot, TRACE_ID_FIELD, SPAN_ID_FIELD};
