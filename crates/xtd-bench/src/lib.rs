//! Benchmark workloads for XTD growable buffers.
//!
//! Provides deterministic operation streams for benchmarks and soak tests:
//!
//! - [`mixed_workload`]: seeded append/pop/clear mix
//! - [`replay`]: drive a [`GrowableBuffer`] through a stream
//! - [`replay_vec`]: the same stream against `Vec<u32>`, as a baseline

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xtd_dyn::{BufferError, GrowableBuffer, RawAllocator};

/// One buffer operation in a workload stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Append(u32),
    Pop,
    Clear,
}

/// Generate `len` operations from `seed`.
///
/// Roughly 70% appends, 29% pops, 1% clears, so the buffer trends upward
/// and crosses several growth boundaries.
pub fn mixed_workload(seed: u64, len: usize) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| match rng.random_range(0..100u32) {
            0..70 => Op::Append(rng.random()),
            70..99 => Op::Pop,
            _ => Op::Clear,
        })
        .collect()
}

/// Apply `ops` to `buffer`. Returns the final element count.
pub fn replay<A: RawAllocator>(
    buffer: &mut GrowableBuffer<u32, A>,
    ops: &[Op],
) -> Result<usize, BufferError> {
    for op in ops {
        match *op {
            Op::Append(v) => buffer.append(v)?,
            Op::Pop => {
                buffer.pop();
            }
            Op::Clear => buffer.clear(),
        }
    }
    Ok(buffer.len())
}

/// Apply `ops` to a `Vec<u32>`. Returns the final element count.
pub fn replay_vec(vec: &mut Vec<u32>, ops: &[Op]) -> usize {
    for op in ops {
        match *op {
            Op::Append(v) => vec.push(v),
            Op::Pop => {
                vec.pop();
            }
            Op::Clear => vec.clear(),
        }
    }
    vec.len()
}
