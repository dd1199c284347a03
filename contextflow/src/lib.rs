//! # Contextflow
//!
//! An initialization-order-safe context propagation core.
//!
//! Contextflow provides a per-strand "current context" storage whose
//! cross-cutting behavior is added through composable storage wrappers:
//!
//! - **Immutable context slots**: key/value snapshots linked to the
//!   previously active slot
//! - **Scoped attachment**: attach a slot, get a scope capability that
//!   restores the previous slot on release, with strict LIFO enforcement
//! - **Freeze-on-first-use wrapper chain**: decorators can be installed up
//!   until the storage is first used; late registrations are rejected with
//!   a result the caller must check, never silently dropped
//! - **Synchronous event fan-out**: attach/detach transitions are published
//!   to registered listeners, with per-listener fault isolation
//! - **Correlation store**: a per-thread map kept in sync with slot
//!   transitions for logging correlation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contextflow::prelude::*;
//! use std::sync::Arc;
//!
//! let storage = ContextStorage::new();
//!
//! // Host startup: wire listeners in before the storage is first used.
//! let report = Bootstrap::new()
//!     .with_listener(Arc::new(CorrelationListener::new()))
//!     .install(&storage)?;
//!
//! // First use freezes the wrapper chain.
//! let mut scope = storage.attach(ContextSlot::for_span("trace-1", "span-1"));
//! // ... correlation::get("trace_id") now yields "trace-1" ...
//! scope.detach()?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod bootstrap;
pub mod context;
pub mod correlation;
pub mod errors;
pub mod events;
pub mod future;
pub mod storage;
pub mod testing;
pub mod utils;
pub mod wrappers;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bootstrap::{Bootstrap, BootstrapReport, RegistrationPolicy};
    pub use crate::context::ContextSlot;
    pub use crate::correlation::CorrelationListener;
    pub use crate::errors::{
        BootstrapError, ContextflowError, ListenerError, RegistrationError,
        ScopeMisuseError,
    };
    pub use crate::events::{
        CollectingEventListener, ContextEvent, EventListener, EventPublisher,
        EventPublishingWrapper, LoggingEventListener, NoOpEventListener,
    };
    pub use crate::future::FutureExt;
    pub use crate::storage::{ContextStorage, Scope};
    pub use crate::wrappers::{RegistrationResult, StorageWrapper, WrapperRegistry};
}
