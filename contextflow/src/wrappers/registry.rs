//! Wrapper registry with freeze-on-first-use semantics.

use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::errors::RegistrationError;
use crate::storage::RawStorage;

/// A composable decorator over the raw storage.
///
/// Wrappers are applied in registration order to build the effective chain:
/// the last-registered wrapper wraps all previous ones and therefore sees
/// every transition outermost.
pub trait StorageWrapper: Send + Sync {
    /// Name used in registration diagnostics.
    fn name(&self) -> &str {
        "wrapper"
    }

    /// Wraps `inner`, returning the decorated storage.
    fn wrap(&self, inner: Arc<dyn RawStorage>) -> Arc<dyn RawStorage>;
}

/// Outcome of a wrapper registration.
///
/// Late registrations (after the chain froze) are the defect class this
/// library exists to surface: the result must be checked, never discarded.
#[must_use = "a registration may be rejected after the storage froze; unchecked results reproduce the silent-loss defect"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    /// The wrapper was appended to the pending chain.
    Accepted,
    /// The wrapper was not installed.
    Rejected {
        /// Why the registration was refused.
        reason: String,
    },
}

impl RegistrationResult {
    /// Returns true when the wrapper was installed.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Returns true when the wrapper was refused.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }

    /// Returns the rejection reason, if rejected.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    /// Converts to a `Result` for use with `?`.
    pub fn ok(self) -> Result<(), RegistrationError> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected { reason } => Err(RegistrationError { reason }),
        }
    }
}

/// The chain fixed at freeze time.
pub(crate) struct EffectiveChain {
    /// The fully decorated storage.
    pub(crate) storage: Arc<dyn RawStorage>,
    /// Number of wrappers folded into the chain.
    pub(crate) wrapper_count: usize,
}

/// Ordered wrapper registrations with a one-time freeze.
///
/// Before the freeze, registrations accumulate in order. The first real use
/// of the owning storage freezes the registry: the effective chain is built
/// exactly once and never changes afterwards. Registrations racing the
/// freeze are deterministically ordered: one that loses the race observes
/// the frozen state and is rejected, never interleaved into a chain that is
/// mid-construction.
#[derive(Default)]
pub struct WrapperRegistry {
    pending: Mutex<Vec<Arc<dyn StorageWrapper>>>,
    effective: OnceLock<EffectiveChain>,
}

impl WrapperRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `wrapper` to the pending chain, or rejects it if the chain
    /// already froze.
    pub fn register(&self, wrapper: Arc<dyn StorageWrapper>) -> RegistrationResult {
        if self.effective.get().is_some() {
            return Self::reject(wrapper.name());
        }

        let mut pending = self.pending.lock();
        // The freeze builds the chain while holding this lock, so the
        // re-check under it is authoritative.
        if self.effective.get().is_some() {
            drop(pending);
            return Self::reject(wrapper.name());
        }
        pending.push(wrapper);
        RegistrationResult::Accepted
    }

    /// Returns true once the effective chain is fixed.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.effective.get().is_some()
    }

    /// Returns the number of wrappers in the effective chain, or `None`
    /// before the freeze.
    #[must_use]
    pub fn wrapper_count(&self) -> Option<usize> {
        self.effective.get().map(|chain| chain.wrapper_count)
    }

    /// Builds the effective chain over `base` on first call and returns it;
    /// later calls return the same chain.
    pub(crate) fn freeze(&self, base: &Arc<dyn RawStorage>) -> &EffectiveChain {
        self.effective.get_or_init(|| {
            let pending = self.pending.lock();
            let mut storage = Arc::clone(base);
            for wrapper in pending.iter() {
                storage = wrapper.wrap(storage);
            }
            debug!(
                wrappers = pending.len(),
                "context storage frozen; wrapper chain is now fixed"
            );
            EffectiveChain {
                storage,
                wrapper_count: pending.len(),
            }
        })
    }

    fn reject(name: &str) -> RegistrationResult {
        warn!(
            wrapper = name,
            "wrapper registered after context storage froze; registration rejected"
        );
        RegistrationResult::Rejected {
            reason: "context storage already frozen".to_string(),
        }
    }
}

impl std::fmt::Debug for WrapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrapperRegistry")
            .field("frozen", &self.is_frozen())
            .field("wrapper_count", &self.wrapper_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextSlot;
    use parking_lot::Mutex as PlMutex;

    // Wrapper that records its own tag when the decorated storage attaches.
    struct TaggingWrapper {
        tag: &'static str,
        log: Arc<PlMutex<Vec<&'static str>>>,
    }

    struct TaggingStorage {
        tag: &'static str,
        log: Arc<PlMutex<Vec<&'static str>>>,
        inner: Arc<dyn RawStorage>,
    }

    impl StorageWrapper for TaggingWrapper {
        fn name(&self) -> &str {
            self.tag
        }

        fn wrap(&self, inner: Arc<dyn RawStorage>) -> Arc<dyn RawStorage> {
            Arc::new(TaggingStorage {
                tag: self.tag,
                log: Arc::clone(&self.log),
                inner,
            })
        }
    }

    impl RawStorage for TaggingStorage {
        fn attach(&self, next: Arc<ContextSlot>) -> Arc<ContextSlot> {
            self.log.lock().push(self.tag);
            self.inner.attach(next)
        }

        fn detach(&self, restored: Arc<ContextSlot>) -> Arc<ContextSlot> {
            self.inner.detach(restored)
        }

        fn current(&self) -> Arc<ContextSlot> {
            self.inner.current()
        }
    }

    struct NullStorage;

    impl RawStorage for NullStorage {
        fn attach(&self, next: Arc<ContextSlot>) -> Arc<ContextSlot> {
            next
        }

        fn detach(&self, restored: Arc<ContextSlot>) -> Arc<ContextSlot> {
            restored
        }

        fn current(&self) -> Arc<ContextSlot> {
            Arc::new(ContextSlot::new())
        }
    }

    fn tagging(tag: &'static str, log: &Arc<PlMutex<Vec<&'static str>>>) -> Arc<dyn StorageWrapper> {
        Arc::new(TaggingWrapper {
            tag,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn test_register_before_freeze_accepted() {
        let registry = WrapperRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));

        assert!(registry.register(tagging("a", &log)).is_accepted());
        assert!(!registry.is_frozen());
    }

    #[test]
    fn test_freeze_fixes_chain_to_prior_registrations() {
        let registry = WrapperRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));

        assert!(registry.register(tagging("a", &log)).is_accepted());
        assert!(registry.register(tagging("b", &log)).is_accepted());

        let base: Arc<dyn RawStorage> = Arc::new(NullStorage);
        let chain = registry.freeze(&base);
        assert_eq!(chain.wrapper_count, 2);
        assert!(registry.is_frozen());
        assert_eq!(registry.wrapper_count(), Some(2));
    }

    #[test]
    fn test_register_after_freeze_rejected() {
        let registry = WrapperRegistry::new();
        let base: Arc<dyn RawStorage> = Arc::new(NullStorage);
        let _ = registry.freeze(&base);

        let log = Arc::new(PlMutex::new(Vec::new()));
        let result = registry.register(tagging("late", &log));
        assert!(result.is_rejected());
        assert_eq!(result.reason(), Some("context storage already frozen"));
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let registry = WrapperRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));
        assert!(registry.register(tagging("a", &log)).is_accepted());

        let base: Arc<dyn RawStorage> = Arc::new(NullStorage);
        let first = Arc::clone(&registry.freeze(&base).storage);
        let second = Arc::clone(&registry.freeze(&base).storage);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_chain_applies_outermost_last() {
        let registry = WrapperRegistry::new();
        let log = Arc::new(PlMutex::new(Vec::new()));

        assert!(registry.register(tagging("first", &log)).is_accepted());
        assert!(registry.register(tagging("second", &log)).is_accepted());

        let base: Arc<dyn RawStorage> = Arc::new(NullStorage);
        let chain = registry.freeze(&base);
        let _ = chain.storage.attach(Arc::new(ContextSlot::new()));

        // The last-registered wrapper is outermost, so it observes first.
        assert_eq!(*log.lock(), vec!["second", "first"]);
    }

    #[test]
    fn test_registration_result_ok_conversion() {
        assert!(RegistrationResult::Accepted.ok().is_ok());

        let err = RegistrationResult::Rejected {
            reason: "context storage already frozen".to_string(),
        }
        .ok()
        .unwrap_err();
        assert!(err.reason.contains("frozen"));
    }
}
