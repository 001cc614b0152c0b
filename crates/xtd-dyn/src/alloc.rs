//! The allocator boundary consumed by growable buffers.
//!
//! A buffer talks to its memory source through three primitives:
//! allocate, resize, and release. [`SystemAllocator`] forwards them to
//! the global heap; tests and embedders substitute their own triple by
//! implementing [`RawAllocator`].

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// An allocate/resize/release triple.
///
/// Buffers never pass zero-sized layouts to an allocator, and a resize
/// request always keeps the alignment of the original block.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of
/// `layout.size()` bytes and aligned to `layout.align()`. A successful
/// `resize` must preserve the first `min(old, new)` bytes of the block.
/// Returning `None` must leave the original block untouched.
pub unsafe trait RawAllocator {
    /// Allocate a fresh block, or `None` if no memory is available.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Grow or shrink `block` to `new_layout`, possibly relocating it.
    ///
    /// A `None` block behaves exactly like [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// When `block` is `Some((ptr, layout))`, `ptr` must have been returned
    /// by this allocator for `layout` and not yet released.
    unsafe fn resize(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>>;

    /// Return a block to the allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator for `layout` and not
    /// yet released.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

// Lets several buffers share one allocator by reference.
unsafe impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    unsafe fn resize(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).resize(block, new_layout) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded caller contract.
        unsafe { (**self).release(ptr, layout) }
    }
}

/// The process heap, via `std::alloc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemAllocator;

unsafe impl RawAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0);
        // SAFETY: buffers never request zero-sized layouts.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    unsafe fn resize(
        &self,
        block: Option<(NonNull<u8>, Layout)>,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        match block {
            None => self.allocate(new_layout),
            Some((ptr, old_layout)) => {
                debug_assert_eq!(old_layout.align(), new_layout.align());
                // SAFETY: `ptr` was allocated here with `old_layout`, and the
                // new size is non-zero and fits a valid layout.
                NonNull::new(unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) })
            }
        }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: `ptr` was allocated here with `layout`.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
