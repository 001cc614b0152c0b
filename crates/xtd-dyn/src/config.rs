//! Buffer configuration parameters.

use crate::error::BufferError;

/// Configuration for a [`GrowableBuffer`](crate::GrowableBuffer).
///
/// Fixed when the buffer is constructed; a buffer never changes its
/// growth policy afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Minimum number of element slots produced by any growth step.
    ///
    /// Default: 16. Must be at least 1.
    pub min_capacity: usize,
}

impl BufferConfig {
    /// Default capacity floor in elements.
    pub const DEFAULT_MIN_CAPACITY: usize = 16;

    /// Create a config with the default capacity floor.
    pub const fn new() -> Self {
        Self {
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
        }
    }

    /// Create a config with a custom capacity floor.
    pub const fn with_min_capacity(min_capacity: usize) -> Self {
        Self { min_capacity }
    }

    /// Check that the configuration can drive a buffer.
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.min_capacity == 0 {
            return Err(BufferError::InvalidConfig {
                reason: "min_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new()
    }
}
