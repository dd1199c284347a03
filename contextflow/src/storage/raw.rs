//! Raw per-strand slot storage, the surface that wrappers decorate.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::ContextSlot;

/// The innermost storage operations wrappers compose around.
///
/// Implementations swap the calling strand's current slot. All operations
/// are synchronous constant-time pointer swaps; they never block and never
/// suspend. Decorators add cross-cutting behavior (event publishing) around
/// these calls.
pub trait RawStorage: Send + Sync {
    /// Makes `next` current for the calling strand, returning the slot it
    /// superseded.
    fn attach(&self, next: Arc<ContextSlot>) -> Arc<ContextSlot>;

    /// Restores `restored` as the strand's current slot, returning the slot
    /// that was current until now.
    fn detach(&self, restored: Arc<ContextSlot>) -> Arc<ContextSlot>;

    /// Returns the calling strand's current slot.
    fn current(&self) -> Arc<ContextSlot>;
}

thread_local! {
    // One entry per storage instance; each thread is an independent strand.
    static STRANDS: RefCell<HashMap<u64, Strand>> = RefCell::new(HashMap::new());
}

/// Per-thread state for one storage instance.
pub(crate) struct Strand {
    /// The strand's current slot.
    pub(crate) current: Arc<ContextSlot>,
    /// Active scope ids, innermost last.
    pub(crate) scopes: Vec<u64>,
}

/// Runs `f` against the calling thread's strand state for `storage_id`,
/// creating it rooted at `root` on first access.
pub(crate) fn with_strand<T>(
    storage_id: u64,
    root: &Arc<ContextSlot>,
    f: impl FnOnce(&mut Strand) -> T,
) -> T {
    STRANDS.with(|strands| {
        let mut strands = strands.borrow_mut();
        let strand = strands.entry(storage_id).or_insert_with(|| Strand {
            current: Arc::clone(root),
            scopes: Vec::new(),
        });
        f(strand)
    })
}

/// The undecorated base storage: plain per-strand slot swaps.
#[derive(Debug)]
pub(crate) struct StrandStorage {
    storage_id: u64,
    root: Arc<ContextSlot>,
}

impl StrandStorage {
    pub(crate) fn new(storage_id: u64, root: Arc<ContextSlot>) -> Self {
        Self { storage_id, root }
    }
}

impl RawStorage for StrandStorage {
    fn attach(&self, next: Arc<ContextSlot>) -> Arc<ContextSlot> {
        with_strand(self.storage_id, &self.root, |strand| {
            std::mem::replace(&mut strand.current, next)
        })
    }

    fn detach(&self, restored: Arc<ContextSlot>) -> Arc<ContextSlot> {
        with_strand(self.storage_id, &self.root, |strand| {
            std::mem::replace(&mut strand.current, restored)
        })
    }

    fn current(&self) -> Arc<ContextSlot> {
        with_strand(self.storage_id, &self.root, |strand| {
            Arc::clone(&strand.current)
        })
    }
}
