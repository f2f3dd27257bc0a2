//! Cost state and cost history
//!
//! Every component cost lives in `[COST_FLOOR, COST_CEILING]`. Values enter
//! the vector only through [`clamp_finite`], so the vector never holds a
//! negative or non-finite cost.

use serde::{Deserialize, Serialize};

use crate::numeric::{clamp_finite, clamp_or_floor};

/// Smallest cost a component may carry
pub const COST_FLOOR: f64 = 1e-4;

/// Largest cost a component may carry
pub const COST_CEILING: f64 = 1.0;

/// Per-component costs, indexed like the dependency matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostVector {
    values: Vec<f64>,
}

impl CostVector {
    /// Every component starts at `value` (clamped into range)
    pub fn uniform(n: usize, value: f64) -> Self {
        let value = clamp_or_floor(value, COST_FLOOR, COST_CEILING);
        Self {
            values: vec![value; n],
        }
    }

    /// Build from raw values; non-finite entries become the floor
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| clamp_or_floor(v, COST_FLOOR, COST_CEILING))
                .collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum over all components
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum over the given component indices
    pub fn sum_of(&self, indices: &[usize]) -> f64 {
        indices.iter().map(|&j| self.values[j]).sum()
    }

    /// Overwrite the costs at `indices` with `candidates`, pairwise.
    ///
    /// Returns `false` and leaves the vector untouched if the lengths differ
    /// or any candidate is non-finite.
    pub fn commit(&mut self, indices: &[usize], candidates: &[f64]) -> bool {
        if indices.len() != candidates.len() {
            return false;
        }
        let mut clamped = Vec::with_capacity(candidates.len());
        for &c in candidates {
            match clamp_finite(c, COST_FLOOR, COST_CEILING) {
                Some(v) => clamped.push(v),
                None => return false,
            }
        }
        for (&j, v) in indices.iter().zip(clamped) {
            self.values[j] = v;
        }
        true
    }
}

/// Total-cost snapshots: the initial total, then one entry per trial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostHistory {
    totals: Vec<f64>,
}

impl CostHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            totals: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, total: f64) {
        self.totals.push(total);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.totals.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.totals.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.totals
    }

    /// Relative reduction from the first to the last snapshot (0.0 if empty)
    pub fn improvement_ratio(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if first > 0.0 => 1.0 - last / first,
            _ => 0.0,
        }
    }
}

impl From<Vec<f64>> for CostHistory {
    fn from(totals: Vec<f64>) -> Self {
        Self { totals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_total() {
        let costs = CostVector::uniform(5, 1.0);
        assert_eq!(costs.len(), 5);
        assert!((costs.total() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_values_clamps() {
        let costs = CostVector::from_values([f64::NAN, -1.0, 0.5, 7.0]);
        assert_eq!(costs.values(), &[COST_FLOOR, COST_FLOOR, 0.5, 1.0]);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut costs = CostVector::uniform(3, 1.0);

        assert!(!costs.commit(&[0, 1], &[0.1, f64::NAN]));
        assert_eq!(costs.values(), &[1.0, 1.0, 1.0]);

        assert!(costs.commit(&[0, 2], &[0.1, 0.2]));
        assert_eq!(costs.values(), &[0.1, 1.0, 0.2]);
        assert!((costs.sum_of(&[0, 2]) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_commit_length_mismatch() {
        let mut costs = CostVector::uniform(2, 1.0);
        assert!(!costs.commit(&[0, 1], &[0.5]));
        assert_eq!(costs.values(), &[1.0, 1.0]);
    }

    #[test]
    fn test_history_improvement_ratio() {
        let history = CostHistory::from(vec![4.0, 3.0, 2.0]);
        assert_eq!(history.first(), Some(4.0));
        assert_eq!(history.last(), Some(2.0));
        assert!((history.improvement_ratio() - 0.5).abs() < 1e-12);
        assert_eq!(CostHistory::new().improvement_ratio(), 0.0);
    }
}
