//! An allocator wrapper that counts the requests passing through it.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use xtd_dyn::{RawAllocator, SystemAllocator};

/// Point-in-time copy of a [`CountingAllocator`]'s counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocCounts {
    /// Successful `allocate` calls, plus `resize` calls with no block.
    pub allocations: usize,
    /// Successful `resize` calls on an existing block.
    pub resizes: usize,
    pub releases: usize,
    /// Bytes currently held by callers.
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`.
    pub peak_bytes: usize,
}

impl AllocCounts {
    /// Total successful requests that produced or moved a block.
    pub fn requests(&self) -> usize {
        self.allocations + self.resizes
    }
}

#[derive(Debug, Default)]
struct Counters {
    allocations: AtomicUsize,
    resizes: AtomicUsize,
    releases: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl Counters {
    fn add_live(&self, bytes: usize) {
        let now = self.live_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_bytes.fetch_max(now, Ordering::Relaxed);
    }

    fn sub_live(&self, bytes: usize) {
        self.live_bytes.fetch_sub(bytes, Ordering::Relaxed);
    }
}

/// Wraps another allocator and counts every request it serves.
///
/// Clones share the same counters, so a test can keep one clone while a
/// buffer owns another.
#[derive(Clone, Debug, Default)]
pub struct CountingAllocator<A = SystemAllocator> {
    inner: A,
    counters: Arc<Counters>,
}

impl CountingAllocator {
    /// Count requests served by the system heap.
    pub fn new() -> Self {
        Self::wrap(SystemAllocator)
    }
}

impl<A> CountingAllocator<A> {
    /// Count requests served by `inner`.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            counters: Arc::default(),
        }
    }

    /// Snapshot the counters.
    pub fn counts(&self) -> AllocCounts {
        let c = &self.counters;
        AllocCounts {
            allocations: c.allocations.load(Ordering::Relaxed),
            resizes: c.resizes.load(Ordering::Relaxed),
            releases: c.releases.load(Ordering::Relaxed),
            live_bytes: c.live_bytes.load(Ordering::Relaxed),
            peak_bytes: c.peak_bytes.load(Ordering::Relaxed),
        }
    }
}

unsafe impl<A: RawAllocator> RawAllocator for CountingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.inner.allocate(layout)?;
        self.counters.allocations.fetch_add(1, Ordering::Relaxed);
        self.counters.add_live(layout.size());
        Some(ptr)
    }

    unsafe fn resize(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract.
        let ptr = unsafe { self.inner.resize(block, new_layout) }?;
        match block {
            Some((_, old_layout)) => {
                self.counters.resizes.fetch_add(1, Ordering::Relaxed);
                self.counters.sub_live(old_layout.size());
            }
            None => {
                self.counters.allocations.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.counters.add_live(new_layout.size());
        Some(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        self.counters.releases.fetch_add(1, Ordering::Relaxed);
        self.counters.sub_live(layout.size());
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.release(ptr, layout) }
    }
}
