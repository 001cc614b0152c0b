//! The growable contiguous buffer.
//!
//! [`GrowableBuffer`] holds a prefix of `count` valid elements inside a
//! block of `capacity` slots. Appends double the capacity when the block
//! is full, never dropping below the configured floor, so a long run of
//! appends costs amortized O(1) per element.
//!
//! ```text
//! items ──► ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!           │ v0 │ v1 │ v2 │ v3 │ ?? │ ?? │ ?? │ ?? │
//!           └────┴────┴────┴────┴────┴────┴────┴────┘
//!           ◄──── count = 4 ───►
//!           ◄────────────── capacity = 8 ───────────►
//! ```

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use log::{debug, trace};

use crate::alloc::{RawAllocator, SystemAllocator};
use crate::config::BufferConfig;
use crate::error::BufferError;
use crate::raw;

/// A contiguous, growable buffer of `Copy` elements.
///
/// Starts unallocated; the first [`append`](Self::append) or
/// [`reserve`](Self::reserve) acquires a block of at least
/// [`min_capacity`](Self::min_capacity) slots from the allocator `A`.
/// The block is returned on [`release`](Self::release) or on drop,
/// whichever comes first.
pub struct GrowableBuffer<T: Copy, A: RawAllocator = SystemAllocator> {
    /// Base of the block, or `None` while unallocated.
    items: Option<NonNull<T>>,
    /// Slots in the block. Zero iff `items` is `None`.
    capacity: usize,
    /// Valid elements at the front of the block.
    count: usize,
    min_capacity: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer owns its block exclusively and hands out references
// only through `&self`/`&mut self`, the same contract as `Vec<T>`.
unsafe impl<T: Copy + Send, A: RawAllocator + Send> Send for GrowableBuffer<T, A> {}
// SAFETY: shared access only reads the block.
unsafe impl<T: Copy + Sync, A: RawAllocator + Sync> Sync for GrowableBuffer<T, A> {}

impl<T: Copy> GrowableBuffer<T> {
    /// Create an unallocated buffer on the system heap.
    pub const fn new() -> Self {
        Self::new_in(SystemAllocator)
    }

    /// Create an unallocated buffer on the system heap with a custom config.
    pub fn with_config(config: BufferConfig) -> Result<Self, BufferError> {
        Self::with_config_in(config, SystemAllocator)
    }
}

impl<T: Copy, A: RawAllocator> GrowableBuffer<T, A> {
    /// Create an unallocated buffer that draws memory from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            items: None,
            capacity: 0,
            count: 0,
            min_capacity: BufferConfig::DEFAULT_MIN_CAPACITY,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Create an unallocated buffer with a custom config and allocator.
    pub fn with_config_in(config: BufferConfig, alloc: A) -> Result<Self, BufferError> {
        config.validate()?;
        let mut buffer = Self::new_in(alloc);
        buffer.min_capacity = config.min_capacity;
        Ok(buffer)
    }

    /// Ensure room for at least `desired_capacity` elements.
    ///
    /// No-op when the buffer is allocated and already large enough. An
    /// unallocated buffer always allocates, even for a desired capacity of
    /// zero, and never gets fewer than [`min_capacity`](Self::min_capacity)
    /// slots. Growth may relocate the block.
    pub fn reserve(&mut self, desired_capacity: usize) -> Result<(), BufferError> {
        self.ensure_capacity(desired_capacity).map(|_| ())
    }

    /// Append `value` at the end of the buffer.
    ///
    /// When the block is full (or missing) it grows to
    /// `max(capacity * 2, min_capacity)` slots first. On error the buffer
    /// is unchanged.
    pub fn append(&mut self, value: T) -> Result<(), BufferError> {
        let block = match self.items {
            Some(block) if self.count < self.capacity => block,
            _ => {
                let doubled = self.capacity.checked_mul(2).ok_or(BufferError::CapacityOverflow {
                    requested_capacity: self.capacity,
                })?;
                self.ensure_capacity(doubled)?
            }
        };
        // SAFETY: `count < capacity` after the growth above, so the slot
        // lies inside the block.
        unsafe { block.as_ptr().add(self.count).write(value) };
        self.count += 1;
        Ok(())
    }

    /// Append every element of `values`, growing at most once.
    ///
    /// The grown capacity is `max(count + values.len(), capacity * 2,
    /// min_capacity)`.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), BufferError> {
        if values.is_empty() {
            return Ok(());
        }
        let needed = self
            .count
            .checked_add(values.len())
            .ok_or(BufferError::CapacityOverflow {
                requested_capacity: usize::MAX,
            })?;
        let block = match self.items {
            Some(block) if needed <= self.capacity => block,
            _ => self.ensure_capacity(needed.max(self.capacity.saturating_mul(2)))?,
        };
        // SAFETY: the block holds at least `needed` slots, and `values`
        // cannot alias it while `self` is mutably borrowed.
        unsafe {
            ptr::copy_nonoverlapping(
                values.as_ptr(),
                block.as_ptr().add(self.count),
                values.len(),
            );
        }
        self.count = needed;
        Ok(())
    }

    /// Remove and return the last element, or `None` if the buffer is empty.
    ///
    /// Capacity is never reduced.
    pub fn pop(&mut self) -> Option<T> {
        let value = *self.as_slice().last()?;
        self.count -= 1;
        Some(value)
    }

    /// Forget every element. Keeps the block and its capacity.
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Return the block to the allocator and reset to the unallocated state.
    ///
    /// Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(block) = self.items.take() {
            debug!("releasing buffer block of {} slots", self.capacity);
            // SAFETY: `block` came from `self.alloc` for `self.capacity` slots
            // and `take()` guarantees it is released only once.
            unsafe { raw::release_buffer(&self.alloc, block, self.capacity) };
        }
        self.capacity = 0;
        self.count = 0;
    }

    /// Move the contents out, leaving `self` unallocated.
    ///
    /// The returned buffer owns the block; the source keeps a clone of the
    /// allocator and its config.
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        let empty = Self {
            items: None,
            capacity: 0,
            count: 0,
            min_capacity: self.min_capacity,
            alloc: self.alloc.clone(),
            _marker: PhantomData,
        };
        std::mem::replace(self, empty)
    }

    /// Number of valid elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Alias for [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots in the current block (0 when unallocated).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the buffer currently holds a block.
    pub fn is_allocated(&self) -> bool {
        self.items.is_some()
    }

    /// Capacity floor applied to every growth step.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Size of the current block in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.capacity * std::mem::size_of::<T>()
    }

    /// The allocator this buffer draws from.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// The valid elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self.items {
            // SAFETY: the first `count` slots of the block are initialized.
            Some(block) => unsafe { std::slice::from_raw_parts(block.as_ptr(), self.count) },
            None => &[],
        }
    }

    /// The valid elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.items {
            // SAFETY: as in `as_slice`; `&mut self` makes the borrow unique.
            Some(block) => unsafe { std::slice::from_raw_parts_mut(block.as_ptr(), self.count) },
            None => &mut [],
        }
    }

    /// Grow to at least `desired` slots and return the block base.
    fn ensure_capacity(&mut self, desired: usize) -> Result<NonNull<T>, BufferError> {
        let current = match self.items {
            Some(block) if self.capacity >= desired => return Ok(block),
            current => current,
        };
        if current.is_none() {
            self.count = 0;
        }

        let target = desired.max(self.min_capacity);
        // SAFETY: `current` came from `self.alloc` for `self.capacity` slots.
        let block = unsafe { raw::grow_buffer(&self.alloc, current, self.capacity, target)? };
        trace!(
            "grew buffer from {} to {target} slots ({} bytes)",
            self.capacity,
            target * std::mem::size_of::<T>()
        );
        self.items = Some(block);
        self.capacity = target;
        Ok(block)
    }
}

impl<T: Copy, A: RawAllocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Copy, A: RawAllocator + Default> Default for GrowableBuffer<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Copy, A: RawAllocator> Deref for GrowableBuffer<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy, A: RawAllocator> DerefMut for GrowableBuffer<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T: Copy, A: RawAllocator> IntoIterator for &'a GrowableBuffer<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: Copy + fmt::Debug, A: RawAllocator> fmt::Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unallocated() {
        let buffer: GrowableBuffer<u32> = GrowableBuffer::new();
        assert!(!buffer.is_allocated());
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.as_slice().is_empty());
    }

    #[test]
    fn growth_scenario_matches_floor_and_doubling() {
        let mut buffer = GrowableBuffer::new();
        buffer.append(0u32).unwrap();
        assert_eq!((buffer.count(), buffer.capacity()), (1, 16));

        for i in 1..17 {
            buffer.append(i).unwrap();
        }
        assert_eq!((buffer.count(), buffer.capacity()), (17, 32));

        buffer.clear();
        assert_eq!((buffer.count(), buffer.capacity()), (0, 32));

        buffer.release();
        assert_eq!((buffer.count(), buffer.capacity()), (0, 0));
        assert!(!buffer.is_allocated());
    }

    #[test]
    fn reserve_zero_on_unallocated_applies_floor() {
        let mut buffer: GrowableBuffer<u8> = GrowableBuffer::new();
        buffer.reserve(0).unwrap();
        assert!(buffer.is_allocated());
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn reserve_above_floor_is_exact() {
        let mut buffer: GrowableBuffer<u64> = GrowableBuffer::new();
        buffer.reserve(100).unwrap();
        assert_eq!(buffer.capacity(), 100);
        buffer.reserve(50).unwrap();
        assert_eq!(buffer.capacity(), 100);
    }

    #[test]
    fn reserve_keeps_contents() {
        let mut buffer = GrowableBuffer::new();
        buffer.extend_from_slice(&[1i64, -2, 3]).unwrap();
        buffer.reserve(1000).unwrap();
        assert_eq!(buffer.as_slice(), &[1, -2, 3]);
    }

    #[test]
    fn append_into_full_block_doubles() {
        let mut buffer = GrowableBuffer::new();
        buffer.reserve(20).unwrap();
        for i in 0..20u16 {
            buffer.append(i).unwrap();
        }
        assert_eq!(buffer.capacity(), 20);
        buffer.append(20).unwrap();
        assert_eq!(buffer.capacity(), 40);
        assert_eq!(buffer.len(), 21);
    }

    #[test]
    fn pop_returns_last_appended() {
        let mut buffer = GrowableBuffer::new();
        buffer.append('x').unwrap();
        assert_eq!(buffer.pop(), Some('x'));
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut buffer: GrowableBuffer<i32> = GrowableBuffer::new();
        assert_eq!(buffer.pop(), None);
        buffer.reserve(4).unwrap();
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn release_twice_is_noop() {
        let mut buffer = GrowableBuffer::new();
        buffer.append(1.5f32).unwrap();
        buffer.release();
        buffer.release();
        assert!(!buffer.is_allocated());
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn buffer_is_reusable_after_release() {
        let mut buffer = GrowableBuffer::new();
        buffer.append(1u8).unwrap();
        buffer.release();
        buffer.append(2u8).unwrap();
        assert_eq!(buffer.as_slice(), &[2]);
        assert_eq!(buffer.capacity(), 16);
    }

    #[test]
    fn custom_floor_drives_first_growth() {
        let mut buffer = GrowableBuffer::with_config(BufferConfig::with_min_capacity(2)).unwrap();
        buffer.append(1u32).unwrap();
        assert_eq!(buffer.capacity(), 2);
        buffer.append(2).unwrap();
        buffer.append(3).unwrap();
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn zero_floor_config_rejected() {
        let result = GrowableBuffer::<u32>::with_config(BufferConfig::with_min_capacity(0));
        assert!(matches!(result, Err(BufferError::InvalidConfig { .. })));
    }

    #[test]
    fn extend_from_slice_grows_once_to_fit() {
        let mut buffer = GrowableBuffer::new();
        let values: Vec<u32> = (0..40).collect();
        buffer.extend_from_slice(&values).unwrap();
        assert_eq!(buffer.capacity(), 40);
        assert_eq!(buffer.as_slice(), values.as_slice());

        buffer.extend_from_slice(&[99]).unwrap();
        assert_eq!(buffer.capacity(), 80);
        assert_eq!(buffer.last(), Some(&99));
    }

    #[test]
    fn extend_from_empty_slice_does_not_allocate() {
        let mut buffer: GrowableBuffer<u32> = GrowableBuffer::new();
        buffer.extend_from_slice(&[]).unwrap();
        assert!(!buffer.is_allocated());
    }

    #[test]
    fn take_moves_block_and_resets_source() {
        let mut source = GrowableBuffer::new();
        source.extend_from_slice(&[4u8, 5, 6]).unwrap();
        let moved = source.take();

        assert_eq!(moved.as_slice(), &[4, 5, 6]);
        assert_eq!(moved.capacity(), 16);
        assert!(!source.is_allocated());
        assert_eq!(source.len(), 0);
        assert_eq!(source.min_capacity(), 16);
    }

    #[test]
    fn slice_access_through_deref() {
        let mut buffer = GrowableBuffer::new();
        buffer.extend_from_slice(&[3u32, 1, 2]).unwrap();
        buffer.sort_unstable();
        assert_eq!(&buffer[..], &[1, 2, 3]);
        buffer[0] = 10;
        assert_eq!(buffer.iter().sum::<u32>(), 15);
        assert_eq!((&buffer).into_iter().count(), 3);
    }

    #[test]
    fn zero_sized_elements_track_count() {
        let mut buffer = GrowableBuffer::new();
        for _ in 0..100 {
            buffer.append(()).unwrap();
        }
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(buffer.memory_bytes(), 0);
        assert_eq!(buffer.pop(), Some(()));
    }

    #[test]
    fn memory_bytes_tracks_capacity() {
        let mut buffer: GrowableBuffer<u32> = GrowableBuffer::new();
        buffer.reserve(10).unwrap();
        assert_eq!(buffer.memory_bytes(), 16 * 4);
    }

    #[test]
    fn debug_lists_valid_elements_only() {
        let mut buffer = GrowableBuffer::new();
        buffer.extend_from_slice(&[1u8, 2]).unwrap();
        assert_eq!(format!("{buffer:?}"), "[1, 2]");
    }

    #[test]
    fn default_is_unallocated() {
        let buffer: GrowableBuffer<u32> = GrowableBuffer::default();
        assert!(!buffer.is_allocated());
        assert_eq!(buffer.min_capacity(), BufferConfig::DEFAULT_MIN_CAPACITY);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn appends_read_back_in_order(values in proptest::collection::vec(any::<i32>(), 0..300)) {
                let mut buffer = GrowableBuffer::new();
                for &v in &values {
                    buffer.append(v).unwrap();
                }
                prop_assert_eq!(buffer.len(), values.len());
                prop_assert!(buffer.capacity() >= values.len());
                prop_assert_eq!(buffer.as_slice(), values.as_slice());
            }

            #[test]
            fn reserve_meets_request_and_floor(k in 0usize..5000) {
                let mut buffer: GrowableBuffer<u64> = GrowableBuffer::new();
                buffer.reserve(k).unwrap();
                prop_assert!(buffer.capacity() >= k);
                prop_assert!(buffer.capacity() >= crate::MIN_CAPACITY);
            }

            #[test]
            fn full_append_at_least_doubles(extra in 0usize..200) {
                let mut buffer = GrowableBuffer::new();
                buffer.reserve(16 + extra).unwrap();
                while buffer.len() < buffer.capacity() {
                    buffer.append(0u8).unwrap();
                }
                let old = buffer.capacity();
                buffer.append(1).unwrap();
                prop_assert!(buffer.capacity() >= 2 * old);
                prop_assert!(buffer.capacity() > old);
            }

            #[test]
            fn pop_undoes_append(
                prefix in proptest::collection::vec(any::<u16>(), 0..50),
                v in any::<u16>(),
            ) {
                let mut buffer = GrowableBuffer::new();
                buffer.extend_from_slice(&prefix).unwrap();
                buffer.append(v).unwrap();
                prop_assert_eq!(buffer.pop(), Some(v));
                prop_assert_eq!(buffer.as_slice(), prefix.as_slice());
            }

            #[test]
            fn count_never_exceeds_capacity(ops in proptest::collection::vec(0u8..4, 0..200)) {
                let mut buffer = GrowableBuffer::new();
                for op in ops {
                    match op {
                        0 | 1 => buffer.append(op).unwrap(),
                        2 => { buffer.pop(); }
                        _ => buffer.clear(),
                    }
                    prop_assert!(buffer.len() <= buffer.capacity());
                }
            }
        }
    }
}
