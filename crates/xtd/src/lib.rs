//! XTD: extended standard utilities.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the XTD sub-crates. For most users, adding `xtd` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use xtd::prelude::*;
//!
//! let mut samples = GrowableBuffer::new();
//! samples.append(3u32)?;
//! samples.extend_from_slice(&[1, 4, 1, 5])?;
//! assert_eq!(samples.capacity(), MIN_CAPACITY);
//!
//! assert_eq!(samples.pop(), Some(5));
//! assert_eq!(samples.as_slice(), &[3, 1, 4, 1]);
//!
//! samples.release();
//! assert!(!samples.is_allocated());
//! # Ok::<(), BufferError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`dynamic`] | `xtd-dyn` | `GrowableBuffer`, allocator boundary, config, errors |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Growable buffers and their allocator boundary (`xtd-dyn`).
///
/// Implement [`dynamic::RawAllocator`] to route a buffer's memory through
/// a custom allocate/resize/release triple.
pub use xtd_dyn as dynamic;

/// Common imports for typical XTD usage.
///
/// ```rust
/// use xtd::prelude::*;
/// ```
pub mod prelude {
    pub use xtd_dyn::{
        BufferConfig, BufferError, GrowableBuffer, RawAllocator, SystemAllocator, MIN_CAPACITY,
    };
}
