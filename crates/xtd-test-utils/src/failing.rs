//! An allocator wrapper that denies requests on demand.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use xtd_dyn::{RawAllocator, SystemAllocator};

/// Serves a fixed number of requests, then returns `None` for every
/// allocate or resize. Releases always go through.
///
/// Optionally also denies any single request larger than a byte limit.
#[derive(Clone, Debug)]
pub struct FailingAllocator<A = SystemAllocator> {
    inner: A,
    succeed_count: usize,
    max_bytes: usize,
    call_count: Arc<AtomicUsize>,
}

impl FailingAllocator {
    /// Serve `succeed_count` requests from the system heap, then fail.
    pub fn after(succeed_count: usize) -> Self {
        Self::wrap(SystemAllocator, succeed_count)
    }

    /// Deny every request.
    pub fn always() -> Self {
        Self::after(0)
    }

    /// Serve any request of at most `max_bytes` bytes, deny the rest.
    pub fn above(max_bytes: usize) -> Self {
        Self::after(usize::MAX).with_max_bytes(max_bytes)
    }
}

impl<A> FailingAllocator<A> {
    /// Serve `succeed_count` requests from `inner`, then fail.
    pub fn wrap(inner: A, succeed_count: usize) -> Self {
        Self {
            inner,
            succeed_count,
            max_bytes: usize::MAX,
            call_count: Arc::default(),
        }
    }

    /// Additionally deny requests larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// How many allocate/resize requests have been seen, served or not.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    fn admit(&self, layout: Layout) -> bool {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        n < self.succeed_count && layout.size() <= self.max_bytes
    }
}

unsafe impl<A: RawAllocator> RawAllocator for FailingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.admit(layout) {
            return None;
        }
        self.inner.allocate(layout)
    }

    unsafe fn resize(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        if !self.admit(new_layout) {
            return None;
        }
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.resize(block, new_layout) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.release(ptr, layout) }
    }
}
