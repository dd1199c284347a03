//! Context propagation across async strands.
//!
//! An async task is its own logical strand, but it may hop between worker
//! threads. [`WithContext`] bridges the two models by attaching its slot
//! around every poll, so code inside the future always observes the slot
//! as current, whichever thread runs it.

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use crate::context::ContextSlot;
use crate::storage::ContextStorage;

pin_project! {
    /// A future or stream with an associated context slot.
    ///
    /// The slot is attached before every poll and released after it, so
    /// wrapper hooks observe one attach/detach pair per poll.
    #[derive(Debug)]
    pub struct WithContext<T> {
        #[pin]
        inner: T,
        storage: ContextStorage,
        slot: ContextSlot,
    }
}

impl<T: std::future::Future> std::future::Future for WithContext<T> {
    type Output = T::Output;

    fn poll(self: Pin<&mut Self>, task_cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let scope = this.storage.attach(this.slot.clone());
        let poll = this.inner.poll(task_cx);
        drop(scope);
        poll
    }
}

impl<T: Stream> Stream for WithContext<T> {
    type Item = T::Item;

    fn poll_next(self: Pin<&mut Self>, task_cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let scope = this.storage.attach(this.slot.clone());
        let poll = T::poll_next(this.inner, task_cx);
        drop(scope);
        poll
    }
}

/// Extension trait attaching context slots to futures and streams.
pub trait FutureExt: Sized {
    /// Associates `slot` with this value, attaching it into `storage`
    /// around every poll.
    fn with_context(self, storage: ContextStorage, slot: ContextSlot) -> WithContext<Self> {
        WithContext {
            inner: self,
            storage,
            slot,
        }
    }

    /// Associates the storage's current slot with this value.
    ///
    /// Reading the current slot is a real use of the storage and freezes
    /// its wrapper chain if that has not happened yet.
    fn with_current_context(self, storage: &ContextStorage) -> WithContext<Self> {
        let slot = (*storage.current()).clone();
        self.with_context(storage.clone(), slot)
    }
}

impl<T: Sized> FutureExt for T {}
