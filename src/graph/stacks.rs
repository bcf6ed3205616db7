//! Mutex-protected LIFO queues used by the traversal phase (C6).
//!
//! Grounded on `examples/original_source/src/dbg.c`'s `kmerstack_t` (a
//! mutex-guarded growable buffer, doubled on overflow) and `edgestack_t` (the
//! same shape, unsynchronized — used only from its owning thread). `Vec`
//! already doubles on growth, so both collapse to a thin wrapper: `SharedStack`
//! adds the mutex for the one stack that crosses threads (the global seed
//! frontier `G`, §4.6); per-thread local k-mer stacks `L` and edge stacks `E`
//! are plain `Vec<T>`, used directly with no wrapper.

use std::sync::Mutex;

/// A growable, mutex-protected LIFO stack shared across traversal workers
/// (the global frontier `G` in §4.8 Phase B).
pub struct SharedStack<T> {
    inner: Mutex<Vec<T>>,
}

impl<T> SharedStack<T> {
    pub fn new() -> Self {
        SharedStack { inner: Mutex::new(Vec::new()) }
    }

    pub fn push(&self, x: T) {
        self.inner.lock().unwrap().push(x);
    }

    /// Push every element of `xs`, taking the lock once.
    pub fn extend(&self, xs: impl IntoIterator<Item = T>) {
        self.inner.lock().unwrap().extend(xs);
    }

    /// Pop returns `None` on empty rather than blocking — workers exit the
    /// traversal loop on an empty frontier instead of waiting (§4.6).
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().unwrap().pop()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for SharedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
