//! Test utilities for XTD development.
//!
//! Provides allocators that observe or sabotage the traffic a buffer
//! sends through its [`RawAllocator`](xtd_dyn::RawAllocator) boundary:
//!
//! - [`CountingAllocator`] records allocate/resize/release calls and
//!   live bytes.
//! - [`FailingAllocator`] denies requests deterministically.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod counting;
pub mod failing;

pub use counting::{AllocCounts, CountingAllocator};
pub use failing::FailingAllocator;
