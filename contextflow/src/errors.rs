//! Error types for the contextflow library.
//!
//! Every failure mode in this crate is local and synchronous; no error here
//! is retryable.

use thiserror::Error;

/// The main error type for contextflow operations.
#[derive(Debug, Error)]
pub enum ContextflowError {
    /// A scope was released out of order.
    #[error("{0}")]
    ScopeMisuse(#[from] ScopeMisuseError),

    /// A wrapper registration was rejected.
    #[error("{0}")]
    RegistrationRejected(#[from] RegistrationError),

    /// An event listener failed while handling an event.
    #[error("{0}")]
    Listener(#[from] ListenerError),

    /// Host bootstrap failed.
    #[error("{0}")]
    Bootstrap(#[from] BootstrapError),
}

/// A scope was released while it was not the innermost active scope on its
/// strand.
///
/// This is a programmer error: scopes must be released in strict LIFO order.
/// The failed release leaves the scope stack untouched, so releasing the
/// intervening scopes first still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("scope {scope_id} released out of order (innermost active scope is {innermost:?})")]
pub struct ScopeMisuseError {
    /// The scope that was released too early.
    pub scope_id: u64,
    /// The scope that should have been released first, if any.
    pub innermost: Option<u64>,
}

/// A wrapper registration arrived after the storage froze its chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wrapper registration rejected: {reason}")]
pub struct RegistrationError {
    /// Why the registration was rejected.
    pub reason: String,
}

/// An event listener returned an error from its event handler.
///
/// Listener errors are isolated: they are collected and reported by the
/// publisher and never abort delivery to other listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("listener '{listener}' failed: {message}")]
pub struct ListenerError {
    /// Name of the failing listener.
    pub listener: String,
    /// Failure description.
    pub message: String,
}

impl ListenerError {
    /// Creates a new listener error.
    #[must_use]
    pub fn new(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while installing wrappers and listeners at host startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// A registration was rejected and the policy demands failing startup.
    #[error("wrapper '{wrapper}' rejected during bootstrap: {reason}")]
    RegistrationRejected {
        /// Name of the rejected wrapper.
        wrapper: String,
        /// Rejection reason reported by the storage.
        reason: String,
    },
}
