//! Buffer error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while growing or configuring a buffer.
///
/// Every failing operation leaves the buffer exactly as it was before
/// the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// The allocator returned no memory for the request.
    AllocationFailure {
        /// Number of bytes requested from the allocator.
        requested_bytes: usize,
        /// Number of element slots the request was sized for.
        requested_capacity: usize,
    },
    /// The requested capacity cannot be expressed as a valid allocation
    /// size for the element type.
    CapacityOverflow {
        /// Number of element slots requested.
        requested_capacity: usize,
    },
    /// A [`BufferConfig`](crate::BufferConfig) failed validation.
    InvalidConfig {
        /// Why the config was rejected.
        reason: String,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure {
                requested_bytes,
                requested_capacity,
            } => {
                write!(
                    f,
                    "allocation failed: requested {requested_bytes} bytes for {requested_capacity} elements"
                )
            }
            Self::CapacityOverflow { requested_capacity } => {
                write!(f, "capacity overflow: {requested_capacity} elements")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid buffer config: {reason}")
            }
        }
    }
}

impl Error for BufferError {}
