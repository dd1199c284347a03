//! Host startup integration.
//!
//! The hosting application registers its wrappers and listeners during its
//! own initialization, at a time that is not guaranteed to precede the
//! first use of the storage. [`Bootstrap`] performs those registrations and
//! forces a decision about rejections: fail startup, or log and record
//! them. What it never does is lose one silently.

use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::BootstrapError;
use crate::events::{EventListener, EventPublisher, EventPublishingWrapper};
use crate::storage::ContextStorage;
use crate::wrappers::{RegistrationResult, StorageWrapper};

/// How to treat a rejected registration during bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Abort startup on the first rejection.
    #[default]
    FailFast,
    /// Log a warning, record the rejection, and keep going.
    WarnAndContinue,
}

/// A rejected registration recorded by a `WarnAndContinue` bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRegistration {
    /// Name of the rejected wrapper.
    pub wrapper: String,
    /// Rejection reason reported by the storage.
    pub reason: String,
}

/// Outcome of a completed bootstrap.
#[derive(Debug, Clone, Default)]
pub struct BootstrapReport {
    /// Number of wrappers installed.
    pub accepted: usize,
    /// Registrations that were rejected (empty under `FailFast` success).
    pub rejected: Vec<RejectedRegistration>,
}

impl BootstrapReport {
    /// True when every registration was accepted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Collects wrappers and listeners and installs them into a storage.
///
/// Listeners ride in through an [`EventPublishingWrapper`] registered after
/// any custom wrappers, so the publisher observes transitions outermost.
#[derive(Default)]
pub struct Bootstrap {
    wrappers: Vec<Arc<dyn StorageWrapper>>,
    listeners: Vec<Arc<dyn EventListener>>,
    policy: RegistrationPolicy,
}

impl Bootstrap {
    /// Creates an empty bootstrap with the default `FailFast` policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rejection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a custom storage wrapper, installed in the order added.
    #[must_use]
    pub fn with_wrapper(mut self, wrapper: Arc<dyn StorageWrapper>) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    /// Adds an event listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Installs everything into `storage`, checking every registration.
    ///
    /// Under [`RegistrationPolicy::FailFast`], the first rejection aborts
    /// with [`BootstrapError::RegistrationRejected`]. Under
    /// [`RegistrationPolicy::WarnAndContinue`], rejections are logged and
    /// recorded in the returned report.
    pub fn install(self, storage: &ContextStorage) -> Result<BootstrapReport, BootstrapError> {
        let mut report = BootstrapReport::default();

        let mut wrappers = self.wrappers;
        if !self.listeners.is_empty() {
            let mut publisher = EventPublisher::new();
            for listener in self.listeners {
                publisher = publisher.with_listener(listener);
            }
            wrappers.push(Arc::new(EventPublishingWrapper::new(Arc::new(publisher))));
        }

        for wrapper in wrappers {
            let name = wrapper.name().to_string();
            match storage.register_wrapper(wrapper) {
                RegistrationResult::Accepted => report.accepted += 1,
                RegistrationResult::Rejected { reason } => match self.policy {
                    RegistrationPolicy::FailFast => {
                        return Err(BootstrapError::RegistrationRejected {
                            wrapper: name,
                            reason,
                        });
                    }
                    RegistrationPolicy::WarnAndContinue => {
                        warn!(
                            wrapper = %name,
                            reason = %reason,
                            "bootstrap registration rejected; continuing without it"
                        );
                        report.rejected.push(RejectedRegistration {
                            wrapper: name,
                            reason,
                        });
                    }
                },
            }
        }

        info!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            "context storage bootstrap finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("wrappers", &self.wrappers.len())
            .field("listeners", &self.listeners.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSlot;
    use crate::events::CollectingEventListener;

    #[test]
    fn test_install_before_first_use() {
        let storage = ContextStorage::new();
        let collector = Arc::new(CollectingEventListener::new());

        let report = Bootstrap::new()
            .with_listener(Arc::clone(&collector) as Arc<dyn EventListener>)
            .install(&storage)
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert!(report.is_complete());

        let mut scope = storage.attach(ContextSlot::for_span("t", "s"));
        assert_eq!(collector.len(), 1);
        scope.detach().unwrap();
    }

    #[test]
    fn test_fail_fast_on_frozen_storage() {
        let storage = ContextStorage::new();
        let _ = storage.current();

        let err = Bootstrap::new()
            .with_listener(Arc::new(CollectingEventListener::new()))
            .install(&storage)
            .unwrap_err();

        match err {
            BootstrapError::RegistrationRejected { wrapper, reason } => {
                assert_eq!(wrapper, "event-publishing");
                assert!(reason.contains("frozen"));
            }
        }
    }

    #[test]
    fn test_warn_and_continue_records_rejections() {
        let storage = ContextStorage::new();
        let _ = storage.current();

        let report = Bootstrap::new()
            .with_policy(RegistrationPolicy::WarnAndContinue)
            .with_listener(Arc::new(CollectingEventListener::new()))
            .install(&storage)
            .unwrap();

        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected.len(), 1);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_empty_bootstrap_is_a_no_op() {
        let storage = ContextStorage::new();
        let report = Bootstrap::new().install(&storage).unwrap();

        assert_eq!(report.accepted, 0);
        assert!(report.is_complete());
        assert!(!storage.is_frozen());
    }
}
