//! Connection matrix storage and composition.

use std::fmt;

use crate::error::{PatchbayError, Result};

/// Symmetric pin adjacency matrix.
///
/// Entry (i, j) set means linear pins i and j are wired together. Only the
/// upper triangle is read when connections are materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMatrix {
    /// Cells (row-major)
    cells: Vec<bool>,
    /// Matrix dimension
    size: usize,
}

impl ConnectionMatrix {
    /// Create an empty matrix for `size` pins.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![false; size * size],
            size,
        }
    }

    /// Build a matrix from 0/1 rows.
    ///
    /// Rows are taken as given; nothing is mirrored.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let size = rows.len();
        let mut matrix = Self::new(size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(PatchbayError::incomplete(format!(
                    "row {} has {} columns, expected {}",
                    row,
                    values.len(),
                    size
                )));
            }
            for (col, &value) in values.iter().enumerate() {
                matrix.cells[row * size + col] = value != 0;
            }
        }
        Ok(matrix)
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the cell at (row, col). Out-of-range cells read as unset.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row * self.size + col]
    }

    /// Wire pins `a` and `b`, setting both (a, b) and (b, a).
    pub fn connect(&mut self, a: usize, b: usize) {
        if a < self.size && b < self.size {
            self.cells[a * self.size + b] = true;
            self.cells[b * self.size + a] = true;
        }
    }

    /// Pairs (i, j), i < j, set in the upper triangle.
    pub fn upper_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).flat_map(move |i| {
            (i + 1..self.size)
                .filter(move |&j| self.cells[i * self.size + j])
                .map(move |j| (i, j))
        })
    }

    /// Number of wires in the upper triangle.
    pub fn wire_count(&self) -> usize {
        self.upper_pairs().count()
    }

    /// Rows as 0/1 vectors.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }
}

impl fmt::Display for ConnectionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let line: Vec<String> = row.iter().map(u8::to_string).collect();
            writeln!(f, "{}", line.join(", "))?;
        }
        Ok(())
    }
}

/// Compose one concrete matrix from one enumerated vector per row.
///
/// `rows[i]` is a vector from `enumerate_vectors(pins - 1 - i, i + 1)`: its
/// leading `pins - 1 - i` entries are the free bits, and they land in columns
/// `i + 1 ..= pins - 1`. The last pin has no higher neighbour and contributes
/// no row. The result is mirrored into the lower triangle.
pub fn build_matrix(pins: usize, rows: &[&[u8]]) -> Result<ConnectionMatrix> {
    let expected_rows = pins.saturating_sub(1);
    if rows.len() != expected_rows {
        return Err(PatchbayError::incomplete(format!(
            "{} pins need {} row vectors, got {}",
            pins,
            expected_rows,
            rows.len()
        )));
    }

    if let Some((i, vector)) = rows.iter().enumerate().find(|(_, v)| v.len() != pins) {
        return Err(PatchbayError::incomplete(format!(
            "row vector {} has width {}, expected {}",
            i,
            vector.len(),
            pins
        )));
    }
    Ok(compose_rows(pins, rows))
}

/// Compose rows already known to have the enumerated shape.
///
/// Bits past a row's free width are ignored and rows past `pins - 1` add
/// nothing, so this cannot fail.
pub(super) fn compose_rows(pins: usize, rows: &[&[u8]]) -> ConnectionMatrix {
    let mut matrix = ConnectionMatrix::new(pins);
    for (i, vector) in rows.iter().enumerate().take(pins.saturating_sub(1)) {
        let free = pins - 1 - i;
        for (k, &bit) in vector.iter().take(free).enumerate() {
            if bit != 0 {
                matrix.connect(i, i + 1 + k);
            }
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_is_symmetric() {
        let mut m = ConnectionMatrix::new(4);
        m.connect(3, 1);
        assert!(m.get(1, 3));
        assert!(m.get(3, 1));
        assert!(!m.get(1, 1));
        assert_eq!(m.upper_pairs().collect::<Vec<_>>(), vec![(1, 3)]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let rows = vec![vec![0, 1], vec![1]];
        assert!(matches!(
            ConnectionMatrix::from_rows(&rows),
            Err(PatchbayError::IncompleteTopology { .. })
        ));
    }

    #[test]
    fn test_upper_triangle_only() {
        // A lower-triangle-only entry is ignored when reading pairs
        let rows = vec![vec![0, 0, 0], vec![1, 0, 0], vec![0, 1, 0]];
        let m = ConnectionMatrix::from_rows(&rows).unwrap();
        assert_eq!(m.wire_count(), 0);
    }

    #[test]
    fn test_build_matrix_places_free_bits_above_diagonal() {
        // 3 pins: row 0 free bits [1, 0] -> (0,1); row 1 free bit [1] -> (1,2)
        let m = build_matrix(3, &[&[1, 0, 0], &[1, 0, 0]]).unwrap();
        assert_eq!(m.upper_pairs().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
        assert_eq!(m.to_rows(), vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]]);
    }

    #[test]
    fn test_build_matrix_checks_shape() {
        assert!(build_matrix(3, &[&[1, 0, 0]]).is_err());
        assert!(build_matrix(3, &[&[1, 0], &[1, 0]]).is_err());
        assert_eq!(build_matrix(1, &[]).unwrap().size(), 1);
    }

    #[test]
    fn test_compose_rows_matches_build_matrix() {
        let rows: [&[u8]; 3] = [&[1, 0, 1, 0], &[0, 1, 0, 0], &[1, 0, 0, 0]];
        assert_eq!(compose_rows(4, &rows), build_matrix(4, &rows).unwrap());

        // Short or surplus rows never panic
        let short: [&[u8]; 1] = [&[1]];
        assert_eq!(compose_rows(3, &short).upper_pairs().collect::<Vec<_>>(), vec![(0, 1)]);
        assert_eq!(compose_rows(2, &rows).wire_count(), 1);
    }

    #[test]
    fn test_display() {
        let mut m = ConnectionMatrix::new(2);
        m.connect(0, 1);
        assert_eq!(m.to_string(), "0, 1\n1, 0\n");
    }
}
