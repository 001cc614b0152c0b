//! Low-level grow-or-allocate primitives.
//!
//! Every allocator call a buffer makes goes through this module. Each
//! `unsafe` function carries a `# Safety` section and every call site a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use log::{error, warn};

use crate::alloc::RawAllocator;
use crate::error::BufferError;

/// Layout of a block holding `capacity` values of `T`.
pub(crate) fn array_layout<T>(capacity: usize) -> Result<Layout, BufferError> {
    Layout::array::<T>(capacity).map_err(|_| {
        warn!(
            "capacity overflow: {capacity} slots of {} bytes",
            std::mem::size_of::<T>()
        );
        BufferError::CapacityOverflow {
            requested_capacity: capacity,
        }
    })
}

/// Grow `block` (or allocate a fresh one) to hold `new_capacity` values.
///
/// Returns the possibly relocated base address. Zero-sized requests never
/// reach the allocator; a dangling, aligned pointer stands in for them.
/// On error the original block is left untouched.
///
/// # Safety
///
/// When `block` is `Some`, it must have been returned by `alloc` for
/// `old_capacity` values of `T` and not yet released.
pub(crate) unsafe fn grow_buffer<T, A: RawAllocator>(
    alloc: &A,
    block: Option<NonNull<T>>,
    old_capacity: usize,
    new_capacity: usize,
) -> Result<NonNull<T>, BufferError> {
    let new_layout = array_layout::<T>(new_capacity)?;
    if new_layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    let current = match block {
        Some(ptr) if old_capacity != 0 => {
            let old_layout = array_layout::<T>(old_capacity)?;
            (old_layout.size() != 0).then(|| (ptr.cast::<u8>(), old_layout))
        }
        _ => None,
    };

    let grown = match current {
        // SAFETY: the caller guarantees `ptr` belongs to `alloc` with `old_layout`.
        Some(existing) => unsafe { alloc.resize(Some(existing), new_layout) },
        None => alloc.allocate(new_layout),
    };

    match grown {
        Some(ptr) => Ok(ptr.cast::<T>()),
        None => {
            error!(
                "allocator denied {} bytes ({new_capacity} slots)",
                new_layout.size()
            );
            Err(BufferError::AllocationFailure {
                requested_bytes: new_layout.size(),
                requested_capacity: new_capacity,
            })
        }
    }
}

/// Return a block of `capacity` values of `T` to `alloc`.
///
/// # Safety
///
/// `block` must have been returned by `alloc` (through [`grow_buffer`]) for
/// `capacity` values of `T` and not yet released.
pub(crate) unsafe fn release_buffer<T, A: RawAllocator>(
    alloc: &A,
    block: NonNull<T>,
    capacity: usize,
) {
    // A layout that was valid at grow time is still valid now.
    let Ok(layout) = Layout::array::<T>(capacity) else {
        return;
    };
    if layout.size() != 0 {
        // SAFETY: the caller guarantees `block` belongs to `alloc` with `layout`.
        unsafe { alloc.release(block.cast::<u8>(), layout) };
    }
}
