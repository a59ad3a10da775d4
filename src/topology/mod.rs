//! Combinatorial enumeration of candidate wirings.
//!
//! A wiring of N pins is a strict upper-triangular adjacency matrix: pin i
//! may only be wired to pins with a higher index. Row i therefore has
//! `N - 1 - i` free bits, and the candidate set is the cross product of the
//! per-row choices:
//!
//! ```text
//! enumerate_vectors(N-1, 1) x enumerate_vectors(N-2, 2) x ... x enumerate_vectors(1, N-1)
//! ```
//!
//! giving `2^(N(N-1)/2)` candidates in total.
//!
//! Nothing here touches device or trace state.

mod candidates;
mod matrix;

pub use candidates::MatrixCandidates;
pub use matrix::{build_matrix, ConnectionMatrix};

use crate::error::{PatchbayError, Result};

/// Widest vector enumeration accepted (2^20 vectors).
pub const MAX_VECTOR_BITS: usize = 20;

/// All binary vectors of width `length + zeros` whose low `zeros` entries are 0.
///
/// The high `length` entries count from 0 to `2^length - 1`, most significant
/// bit first, so the output is in increasing integer order:
///
/// ```
/// use patchbay_core::topology::enumerate_vectors;
///
/// let vectors = enumerate_vectors(2, 1).unwrap();
/// assert_eq!(vectors, vec![vec![0, 0, 0], vec![0, 1, 0], vec![1, 0, 0], vec![1, 1, 0]]);
/// ```
pub fn enumerate_vectors(length: usize, zeros: usize) -> Result<Vec<Vec<u8>>> {
    if length > MAX_VECTOR_BITS {
        return Err(PatchbayError::EnumerationTooLarge {
            length,
            limit: MAX_VECTOR_BITS,
        });
    }

    let width = length + zeros;
    let vectors = (0..1usize << length)
        .map(|value| {
            let mut vector = vec![0u8; width];
            for bit in 0..length {
                vector[length - 1 - bit] = ((value >> bit) & 1) as u8;
            }
            vector
        })
        .collect();

    Ok(vectors)
}

/// Free bits in a wiring of `pins` pins: `pins * (pins - 1) / 2`.
///
/// The candidate count is `2^candidate_bits(pins)`. Exact for every `usize`.
pub fn candidate_bits(pins: usize) -> u128 {
    let n = pins as u128;
    let m = n.saturating_sub(1);
    if n % 2 == 0 {
        n / 2 * m
    } else {
        m / 2 * n
    }
}

/// Number of candidate matrices for `pins` pins, or `None` if it overflows `u128`.
pub fn candidate_count(pins: usize) -> Option<u128> {
    (1..pins).try_fold(1u128, |total, i| {
        let per_row = 1u128.checked_shl(u32::try_from(pins - i).ok()?)?;
        total.checked_mul(per_row)
    })
}
