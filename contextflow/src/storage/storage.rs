//! The context storage facade: freeze-on-first-use plus scope discipline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use super::raw::{with_strand, RawStorage, StrandStorage};
use super::scope::Scope;
use crate::context::ContextSlot;
use crate::errors::ScopeMisuseError;
use crate::wrappers::{RegistrationResult, StorageWrapper, WrapperRegistry};

static NEXT_STORAGE_ID: AtomicU64 = AtomicU64::new(1);

static GLOBAL_STORAGE: OnceLock<ContextStorage> = OnceLock::new();

/// Returns the process-wide storage instance, created on first access.
///
/// The global storage lives for the whole process; there is no mid-process
/// reset. Tests needing isolation should construct their own
/// [`ContextStorage`] instead.
pub fn global() -> &'static ContextStorage {
    GLOBAL_STORAGE.get_or_init(ContextStorage::new)
}

/// Holder of the current context slot, one value per execution strand.
///
/// The storage starts out accepting wrapper registrations. The first call
/// to [`current`](ContextStorage::current) or
/// [`attach`](ContextStorage::attach) freezes the wrapper chain: whatever
/// was registered up to that point becomes the fixed effective chain, and
/// every later registration returns [`RegistrationResult::Rejected`],
/// never a silent no-op.
///
/// Cloning the storage yields another handle to the same instance.
#[derive(Clone)]
pub struct ContextStorage {
    core: Arc<StorageCore>,
}

pub(crate) struct StorageCore {
    id: u64,
    root: Arc<ContextSlot>,
    base: Arc<dyn RawStorage>,
    registry: WrapperRegistry,
    next_scope_id: AtomicU64,
}

impl StorageCore {
    fn chain(&self) -> Arc<dyn RawStorage> {
        Arc::clone(&self.registry.freeze(&self.base).storage)
    }

    /// Releases `scope_id`, restoring `previous`, enforcing LIFO order.
    pub(crate) fn release_scope(
        &self,
        scope_id: u64,
        previous: &Arc<ContextSlot>,
    ) -> Result<(), ScopeMisuseError> {
        with_strand(self.id, &self.root, |strand| {
            match strand.scopes.last().copied() {
                Some(top) if top == scope_id => {
                    strand.scopes.pop();
                    Ok(())
                }
                innermost => Err(ScopeMisuseError { scope_id, innermost }),
            }
        })?;

        let _detached = self.chain().detach(Arc::clone(previous));
        Ok(())
    }
}

impl ContextStorage {
    /// Creates a new storage with an empty root slot and no wrappers.
    #[must_use]
    pub fn new() -> Self {
        let id = NEXT_STORAGE_ID.fetch_add(1, Ordering::Relaxed);
        let root = Arc::new(ContextSlot::new());
        Self {
            core: Arc::new(StorageCore {
                id,
                root: Arc::clone(&root),
                base: Arc::new(StrandStorage::new(id, root)),
                registry: WrapperRegistry::new(),
                next_scope_id: AtomicU64::new(1),
            }),
        }
    }

    /// Returns the calling strand's current slot, or the root slot if
    /// nothing is attached.
    ///
    /// This is a *real use*: the first call freezes the wrapper chain.
    #[must_use]
    pub fn current(&self) -> Arc<ContextSlot> {
        self.core.chain().current()
    }

    /// Makes `slot` current for the calling strand.
    ///
    /// The slot's parent link is set to the slot being superseded, and the
    /// wrapper chain observes the transition. The returned [`Scope`]
    /// restores the previous slot when released.
    ///
    /// This is a *real use*: the first call freezes the wrapper chain.
    pub fn attach(&self, slot: ContextSlot) -> Scope {
        let chain = self.core.chain();
        let previous = chain.current();
        let next = Arc::new(slot.with_parent(Arc::clone(&previous)));
        let _superseded = chain.attach(Arc::clone(&next));

        let scope_id = self.core.next_scope_id.fetch_add(1, Ordering::Relaxed);
        with_strand(self.core.id, &self.core.root, |strand| {
            strand.scopes.push(scope_id);
        });

        Scope::new(Arc::clone(&self.core), scope_id, previous, next)
    }

    /// Registers a storage wrapper.
    ///
    /// Returns [`RegistrationResult::Accepted`] before the freeze and
    /// [`RegistrationResult::Rejected`] after it. The result is
    /// `#[must_use]`: the caller decides whether a rejection is fatal, but
    /// it can never go unnoticed.
    pub fn register_wrapper(&self, wrapper: Arc<dyn StorageWrapper>) -> RegistrationResult {
        self.core.registry.register(wrapper)
    }

    /// Returns true once the wrapper chain is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.core.registry.is_frozen()
    }

    /// Returns the number of wrappers in the effective chain, or `None`
    /// before the freeze.
    #[must_use]
    pub fn wrapper_count(&self) -> Option<usize> {
        self.core.registry.wrapper_count()
    }

    /// The storage's root slot.
    #[must_use]
    pub fn root(&self) -> Arc<ContextSlot> {
        Arc::clone(&self.core.root)
    }
}

impl Default for ContextStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStorage")
            .field("id", &self.core.id)
            .field("frozen", &self.is_frozen())
            .field("wrapper_count", &self.wrapper_count())
            .finish()
    }
}
