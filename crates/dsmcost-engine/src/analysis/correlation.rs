//! Row correlation of a DSM
//!
//! Entry `(i, j)` is the cosine similarity of rows `i` and `j`: how much the
//! two components' change-propagation footprints overlap.

use dsmcost_common::{clamp_or_floor, DependencyMatrix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    n: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn from_dsm(matrix: &DependencyMatrix) -> Self {
        let n = matrix.len();
        let norms: Vec<usize> = matrix
            .rows()
            .map(|row| row.iter().filter(|&&c| c).count())
            .collect();

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let dot = matrix
                    .row(i)
                    .iter()
                    .zip(matrix.row(j))
                    .filter(|&(&a, &b)| a && b)
                    .count();
                let raw = dot as f64 / ((norms[i] * norms[j]) as f64).sqrt();
                // Empty rows divide by zero; they correlate with nothing
                values[i * n + j] = clamp_or_floor(raw, 0.0, 1.0);
            }
        }

        Self { n, values }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .chunks(self.n.max(1))
            .map(<[f64]>::to_vec)
            .collect()
    }

    /// Mean off-diagonal correlation
    pub fn mean_off_diagonal(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..self.n {
            for j in 0..self.n {
                if i != j {
                    sum += self.get(i, j);
                }
            }
        }
        sum / (self.n * (self.n - 1)) as f64
    }
}

/// Cosine-similarity matrix of the DSM's rows
pub fn correlation_matrix(matrix: &DependencyMatrix) -> CorrelationMatrix {
    CorrelationMatrix::from_dsm(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rows_are_orthogonal() {
        let corr = correlation_matrix(&DependencyMatrix::identity(4));
        for i in 0..4 {
            assert_eq!(corr.get(i, i), 1.0);
            for j in 0..4 {
                if i != j {
                    assert_eq!(corr.get(i, j), 0.0);
                }
            }
        }
        assert_eq!(corr.mean_off_diagonal(), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let m = DependencyMatrix::from_rows(vec![
            vec![true, true, false],
            vec![false, true, true],
            vec![false, false, false],
        ])
        .unwrap();
        let corr = correlation_matrix(&m);

        assert!((corr.get(0, 1) - 0.5).abs() < 1e-12);
        assert_eq!(corr.get(0, 1), corr.get(1, 0));
        // Empty row: zero instead of NaN
        assert_eq!(corr.get(2, 2), 0.0);
        assert_eq!(corr.get(0, 2), 0.0);
        assert_eq!(corr.to_rows().len(), 3);
    }
}
