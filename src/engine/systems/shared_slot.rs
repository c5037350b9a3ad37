use std::sync::Arc;
use std::sync::atomic::{ AtomicU64, Ordering };

use parking_lot::Mutex;

struct Inner<T> {
    value: Mutex<Option<T>>,
    generation: AtomicU64,
}

/// Latest-value hand-off between one producer thread and the render thread.
///
/// A publish replaces the whole value under the lock, so a reader never sees a
/// half-written matrix or audio block. Older values are overwritten, not queued.
pub struct SharedSlot<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SharedSlot<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Default for SharedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner { value: Mutex::new(None), generation: AtomicU64::new(0) }),
        }
    }

    pub fn publish(&self, value: T) {
        let mut slot = self.inner.value.lock();
        *slot = Some(value);
        self.inner.generation.fetch_add(1, Ordering::Release);
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Moves the latest value out, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.inner.value.lock().take()
    }
}

impl<T: Clone> SharedSlot<T> {
    pub fn latest(&self) -> Option<T> {
        self.inner.value.lock().clone()
    }
}

/// Reader side that remembers the last generation it consumed.
pub struct SlotReader<T> {
    slot: SharedSlot<T>,
    seen: u64,
}

impl<T: Clone> SlotReader<T> {
    pub fn new(slot: SharedSlot<T>) -> Self {
        Self { slot, seen: 0 }
    }

    /// Copies the latest value if anything was published since the last call.
    pub fn poll(&mut self) -> Option<T> {
        let generation = self.slot.generation();
        if generation == self.seen {
            return None;
        }
        self.seen = generation;
        self.slot.latest()
    }
}
