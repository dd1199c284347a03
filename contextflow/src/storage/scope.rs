//! Scope capability returned by attach.

use std::marker::PhantomData;
use std::sync::Arc;
use tracing::error;

use super::storage::StorageCore;
use crate::context::ContextSlot;
use crate::errors::ScopeMisuseError;

/// A capability representing an active attachment.
///
/// Releasing the scope restores the slot that was current before the
/// attach. Scopes must be released in strict LIFO order per strand;
/// releasing one while an inner scope is still active fails and leaves all
/// state unchanged, so the inner scopes can still be released correctly.
///
/// Scopes are bound to the strand that created them and cannot be sent to
/// another thread. Dropping a scope releases it as well; an out-of-order
/// drop is logged, since drop cannot return the error.
#[must_use = "dropping a scope immediately restores the previous slot"]
pub struct Scope {
    core: Arc<StorageCore>,
    scope_id: u64,
    previous: Arc<ContextSlot>,
    attached: Arc<ContextSlot>,
    released: bool,
    // relies on thread-local state, so must stay on its strand
    _not_send: PhantomData<*const ()>,
}

impl Scope {
    pub(crate) fn new(
        core: Arc<StorageCore>,
        scope_id: u64,
        previous: Arc<ContextSlot>,
        attached: Arc<ContextSlot>,
    ) -> Self {
        Self {
            core,
            scope_id,
            previous,
            attached,
            released: false,
            _not_send: PhantomData,
        }
    }

    /// The slot this scope made current.
    #[must_use]
    pub fn slot(&self) -> &Arc<ContextSlot> {
        &self.attached
    }

    /// The slot that will be restored when this scope is released.
    #[must_use]
    pub fn previous(&self) -> &Arc<ContextSlot> {
        &self.previous
    }

    /// Releases the scope, restoring the previous slot.
    ///
    /// Fails with [`ScopeMisuseError`] if an inner scope on the same strand
    /// is still active; the failed release changes nothing, so the scope
    /// can be released again once the inner scopes are gone. Releasing an
    /// already-released scope is a no-op.
    pub fn detach(&mut self) -> Result<(), ScopeMisuseError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ScopeMisuseError> {
        if self.released {
            return Ok(());
        }
        self.core.release_scope(self.scope_id, &self.previous)?;
        self.released = true;
        Ok(())
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            // Cannot propagate from drop; the scope stays on the strand's
            // stack and the current slot is left as-is.
            error!(error = %err, "scope dropped out of order");
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("scope_id", &self.scope_id)
            .field("released", &self.released)
            .finish()
    }
}
