//! Lazy iteration over every candidate matrix.

use super::matrix::compose_rows;
use super::{candidate_count, enumerate_vectors, ConnectionMatrix};
use crate::error::Result;

/// Iterator over all candidate connection matrices for a pin count.
///
/// Per-row vector sets are enumerated once up front; matrices are composed on
/// demand in odometer order, with the last row varying fastest.
#[derive(Debug, Clone)]
pub struct MatrixCandidates {
    pins: usize,
    /// Enumerated vectors for rows 0 ..= pins - 2
    variants: Vec<Vec<Vec<u8>>>,
    cursor: Vec<usize>,
    done: bool,
}

impl MatrixCandidates {
    /// Enumerate the per-row vector sets for `pins` pins.
    pub fn new(pins: usize) -> Result<Self> {
        let variants = (1..pins)
            .map(|i| enumerate_vectors(pins - i, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            pins,
            cursor: vec![0; variants.len()],
            variants,
            done: false,
        })
    }

    pub fn pins(&self) -> usize {
        self.pins
    }

    /// Total number of candidates, if representable.
    pub fn total(&self) -> Option<u128> {
        candidate_count(self.pins)
    }

    fn advance(&mut self) {
        for row in (0..self.cursor.len()).rev() {
            self.cursor[row] += 1;
            if self.cursor[row] < self.variants[row].len() {
                return;
            }
            self.cursor[row] = 0;
        }
        self.done = true;
    }
}

impl Iterator for MatrixCandidates {
    type Item = ConnectionMatrix;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rows: Vec<&[u8]> = self
            .cursor
            .iter()
            .zip(&self.variants)
            .map(|(&index, vectors)| vectors[index].as_slice())
            .collect();
        let matrix = compose_rows(self.pins, &rows);

        self.advance();
        Some(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_pins_yield_all_eight_wirings() {
        let candidates: Vec<_> = MatrixCandidates::new(3).unwrap().collect();
        assert_eq!(candidates.len(), 8);

        let mut wirings: Vec<Vec<(usize, usize)>> = candidates
            .iter()
            .map(|m| m.upper_pairs().collect())
            .collect();
        wirings.sort();
        wirings.dedup();
        assert_eq!(wirings.len(), 8);

        // First candidate is the empty wiring, last is fully wired
        assert_eq!(candidates[0].wire_count(), 0);
        assert_eq!(candidates[7].wire_count(), 3);
    }

    #[test]
    fn test_last_row_varies_fastest() {
        let mut candidates = MatrixCandidates::new(3).unwrap();
        candidates.next();
        let second = candidates.next().unwrap();
        assert_eq!(second.upper_pairs().collect::<Vec<_>>(), vec![(1, 2)]);
    }

    #[test]
    fn test_count_matches_total() {
        let candidates = MatrixCandidates::new(4).unwrap();
        assert_eq!(candidates.total(), Some(64));
        assert_eq!(candidates.count(), 64);
    }

    #[test]
    fn test_degenerate_pin_counts() {
        assert_eq!(MatrixCandidates::new(0).unwrap().count(), 1);
        let single: Vec<_> = MatrixCandidates::new(1).unwrap().collect();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].size(), 1);
    }

    #[test]
    fn test_every_candidate_is_symmetric() {
        for matrix in MatrixCandidates::new(4).unwrap() {
            for i in 0..4 {
                assert!(!matrix.get(i, i));
                for j in 0..4 {
                    assert_eq!(matrix.get(i, j), matrix.get(j, i));
                }
            }
        }
    }
}
