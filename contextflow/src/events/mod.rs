//! Event system for observing slot transitions.
//!
//! Every attach/detach flows through the frozen wrapper chain; if an
//! [`EventPublishingWrapper`] is part of it, the transition is published
//! synchronously to every registered listener on the calling strand.

mod event;
mod listener;
mod publisher;
mod publishing;

pub use event::ContextEvent;
pub use listener::{
    CollectingEventListener, EventListener, LoggingEventListener, NoOpEventListener,
};
pub use publisher::EventPublisher;
pub use publishing::EventPublishingWrapper;
