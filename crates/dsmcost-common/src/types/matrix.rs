//! DependencyMatrix - Design Structure Matrix over component indices
//!
//! Convention used throughout the workspace: `M[i][j] == true` means a design
//! change in component `i` propagates to component `j`. Row `i` therefore
//! lists the components whose costs are redrawn when `i` is sampled.

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

/// Square boolean matrix stored row-major, serialized as nested rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct DependencyMatrix {
    /// Number of components
    n: usize,
    /// Row-major cells, `n * n` entries
    cells: Vec<bool>,
}

impl DependencyMatrix {
    /// Create an `n × n` matrix with no dependencies
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            cells: vec![false; n * n],
        }
    }

    /// Create an `n × n` matrix with only the diagonal set
    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::empty(n);
        for i in 0..n {
            matrix.set(i, i, true);
        }
        matrix
    }

    /// Build from nested rows. Returns `None` if the rows are not square.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            return None;
        }
        Some(Self {
            n,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of components
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.n + j] = value;
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> &[bool] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks(0) panics, so an empty matrix yields no rows
        self.cells.chunks(self.n.max(1))
    }

    /// Components reached from `i`, the diagonal included when set
    pub fn neighborhood(&self, i: usize) -> Vec<usize> {
        self.row(i)
            .iter()
            .enumerate()
            .filter_map(|(j, &linked)| linked.then_some(j))
            .collect()
    }

    /// Off-diagonal out-degree of row `i`
    pub fn out_degree(&self, i: usize) -> usize {
        self.row(i)
            .iter()
            .enumerate()
            .filter(|&(j, &linked)| linked && j != i)
            .count()
    }

    /// Off-diagonal in-degree of column `j`
    pub fn in_degree(&self, j: usize) -> usize {
        (0..self.n).filter(|&i| i != j && self.get(i, j)).count()
    }

    /// Total number of set cells, diagonal included
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Fraction of off-diagonal cells that are set
    pub fn density(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let off_diagonal: usize = (0..self.n).map(|i| self.out_degree(i)).sum();
        off_diagonal as f64 / (self.n * (self.n - 1)) as f64
    }

    /// Nested rows for serialization to presentation layers
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows().map(<[bool]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<bool>>> for DependencyMatrix {
    type Error = ParameterError;

    fn try_from(rows: Vec<Vec<bool>>) -> Result<Self, Self::Error> {
        let count = rows.len();
        Self::from_rows(rows).ok_or(ParameterError::NonSquareMatrix { rows: count })
    }
}

impl From<DependencyMatrix> for Vec<Vec<bool>> {
    fn from(matrix: DependencyMatrix) -> Self {
        matrix.to_rows()
    }
}
