//! Growable contiguous buffers for trivially copyable elements.
//!
//! Provides [`GrowableBuffer`], a dynamic array with an explicit growth
//! policy: appends double the capacity when the block is full, and no
//! growth step ever produces fewer than [`MIN_CAPACITY`] slots (or the
//! floor set in [`BufferConfig`]). Memory comes from a pluggable
//! allocate/resize/release triple, the [`RawAllocator`] trait.
//!
//! # Architecture
//!
//! ```text
//! GrowableBuffer<T, A> (items / capacity / count)
//! ├── BufferConfig (capacity floor, fixed at construction)
//! ├── raw::grow_buffer (layout math, allocate-or-resize)
//! └── A: RawAllocator (SystemAllocator by default)
//! ```
//!
//! # Failure model
//!
//! Every capacity-changing operation returns `Result<_, BufferError>`.
//! A failed growth leaves the buffer exactly as it was. Popping an empty
//! buffer yields `None`.
//!
//! # Unsafe code
//!
//! Confined to `alloc`, `raw`, and `buffer`, each opting in with a
//! module-level `allow`. The rest of the crate denies it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod buffer;
pub mod config;
pub mod error;
mod raw;

// Public re-exports for the primary API surface.
pub use alloc::{RawAllocator, SystemAllocator};
pub use buffer::GrowableBuffer;
pub use config::BufferConfig;
pub use error::BufferError;

/// Default capacity floor, in elements.
pub const MIN_CAPACITY: usize = BufferConfig::DEFAULT_MIN_CAPACITY;
