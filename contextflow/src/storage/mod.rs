//! Context storage: per-strand current slot with a freezing wrapper chain.
//!
//! This module provides:
//! - The [`RawStorage`] surface that wrappers decorate
//! - The [`ContextStorage`] facade with freeze-on-first-use registration
//! - The [`Scope`] capability enforcing LIFO release order
//! - The process-wide [`global`] storage instance

mod raw;
mod scope;
#[allow(clippy::module_inception)]
mod storage;

pub use raw::RawStorage;
pub use scope::Scope;
pub use storage::{global, ContextStorage};
