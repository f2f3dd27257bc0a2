//! Randomized DSM generation with controllable fan-out
//!
//! Degree modes set the diagonal and choose distinct off-diagonal targets per
//! row with a partial Fisher-Yates shuffle. The probability mode sets each
//! off-diagonal cell independently and leaves the diagonal empty.

use dsmcost_common::{DependencyMatrix, GenerationMode, ParameterError, Result, MIN_COMPONENTS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Notice that a parameter was clamped rather than rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterAdjusted {
    pub requested: usize,
    pub effective: usize,
}

/// A generated matrix plus the degree it was actually built with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDsm {
    pub matrix: DependencyMatrix,
    pub mode: GenerationMode,
    pub requested_degree: usize,
    pub effective_degree: usize,
    /// Present when `requested_degree` had to be clamped
    pub adjustment: Option<ParameterAdjusted>,
}

/// Clamp `d` into `[1, n-1]`, reporting the adjustment if one was made
pub fn clamp_degree(n: usize, d: usize) -> (usize, Option<ParameterAdjusted>) {
    let max = n.saturating_sub(1).max(1);
    let effective = d.clamp(1, max);
    let adjustment = (effective != d).then_some(ParameterAdjusted {
        requested: d,
        effective,
    });
    (effective, adjustment)
}

pub struct DsmGenerator;

impl DsmGenerator {
    /// Build an `n × n` DSM.
    ///
    /// `n < 2` is rejected; `d` outside `[1, n-1]` is clamped.
    pub fn generate<R: Rng + ?Sized>(
        n: usize,
        d: usize,
        mode: GenerationMode,
        rng: &mut R,
    ) -> Result<GeneratedDsm> {
        if n < MIN_COMPONENTS {
            return Err(ParameterError::TooFewComponents { n }.into());
        }

        let (effective, adjustment) = clamp_degree(n, d);
        if let Some(adj) = adjustment {
            warn!(
                requested = adj.requested,
                effective = adj.effective,
                components = n,
                "Dependency degree clamped"
            );
        }

        let matrix = match mode {
            GenerationMode::Fixed | GenerationMode::Random => {
                Self::degree_matrix(n, effective, mode, rng)
            }
            GenerationMode::Probability => Self::probability_matrix(n, effective, rng),
        };

        debug!(
            components = n,
            degree = effective,
            mode = %mode,
            edges = matrix.edge_count(),
            "Generated DSM"
        );

        Ok(GeneratedDsm {
            matrix,
            mode,
            requested_degree: d,
            effective_degree: effective,
            adjustment,
        })
    }

    fn degree_matrix<R: Rng + ?Sized>(
        n: usize,
        d: usize,
        mode: GenerationMode,
        rng: &mut R,
    ) -> DependencyMatrix {
        let mut matrix = DependencyMatrix::identity(n);
        let mut candidates = Vec::with_capacity(n - 1);

        for i in 0..n {
            let out_degree = match mode {
                GenerationMode::Random => rng.gen_range(1..=d),
                _ => d,
            };

            candidates.clear();
            candidates.extend((0..n).filter(|&j| j != i));

            // Partial Fisher-Yates: the first `out_degree` slots end up a uniform sample
            for k in 0..out_degree {
                let pick = rng.gen_range(k..candidates.len());
                candidates.swap(k, pick);
                matrix.set(i, candidates[k], true);
            }
        }

        matrix
    }

    fn probability_matrix<R: Rng + ?Sized>(
        n: usize,
        d: usize,
        rng: &mut R,
    ) -> DependencyMatrix {
        let p = 1.0 / d as f64;
        let mut matrix = DependencyMatrix::empty(n);
        for i in 0..n {
            for j in 0..n {
                if i != j && rng.gen::<f64>() < p {
                    matrix.set(i, j, true);
                }
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimRng;

    #[test]
    fn test_fixed_degree_rows() {
        let mut rng = SimRng::new(11);
        let dsm = DsmGenerator::generate(10, 3, GenerationMode::Fixed, &mut rng).unwrap();

        assert_eq!(dsm.effective_degree, 3);
        assert!(dsm.adjustment.is_none());
        for i in 0..10 {
            assert!(dsm.matrix.get(i, i));
            assert_eq!(dsm.matrix.out_degree(i), 3);
        }
    }

    #[test]
    fn test_random_degree_rows() {
        let mut rng = SimRng::new(12);
        let dsm = DsmGenerator::generate(12, 5, GenerationMode::Random, &mut rng).unwrap();

        for i in 0..12 {
            assert!(dsm.matrix.get(i, i));
            let degree = dsm.matrix.out_degree(i);
            assert!((1..=5).contains(&degree), "row {} has degree {}", i, degree);
        }
    }

    #[test]
    fn test_three_components_one_edge_each() {
        let mut rng = SimRng::new(3);
        let dsm = DsmGenerator::generate(3, 1, GenerationMode::Fixed, &mut rng).unwrap();
        for i in 0..3 {
            assert_eq!(dsm.matrix.out_degree(i), 1);
            assert_eq!(dsm.matrix.neighborhood(i).len(), 2);
        }
    }

    #[test]
    fn test_degree_clamped_to_n_minus_one() {
        let mut rng = SimRng::new(5);
        let dsm = DsmGenerator::generate(2, 5, GenerationMode::Fixed, &mut rng).unwrap();

        assert_eq!(dsm.effective_degree, 1);
        assert_eq!(dsm.requested_degree, 5);
        assert_eq!(
            dsm.adjustment,
            Some(ParameterAdjusted {
                requested: 5,
                effective: 1
            })
        );
        // Two components, degree one: fully connected
        assert!(dsm.matrix.get(0, 1));
        assert!(dsm.matrix.get(1, 0));
    }

    #[test]
    fn test_zero_degree_clamped_up() {
        let (effective, adjustment) = clamp_degree(6, 0);
        assert_eq!(effective, 1);
        assert_eq!(adjustment.map(|a| a.requested), Some(0));
        assert_eq!(clamp_degree(6, 5), (5, None));
    }

    #[test]
    fn test_too_few_components() {
        let mut rng = SimRng::new(1);
        let err = DsmGenerator::generate(1, 1, GenerationMode::Fixed, &mut rng).unwrap_err();
        assert!(err.to_string().contains("at least 2 components"));
    }

    #[test]
    fn test_probability_mode_has_empty_diagonal() {
        let mut rng = SimRng::new(21);
        let dsm = DsmGenerator::generate(15, 2, GenerationMode::Probability, &mut rng).unwrap();
        for i in 0..15 {
            assert!(!dsm.matrix.get(i, i));
        }
        // p = 1/2 over 210 off-diagonal cells
        let edges = dsm.matrix.edge_count();
        assert!(edges > 60 && edges < 150, "edges = {}", edges);
    }

    #[test]
    fn test_probability_mode_degree_one_is_complete() {
        let mut rng = SimRng::new(2);
        let dsm = DsmGenerator::generate(5, 1, GenerationMode::Probability, &mut rng).unwrap();
        assert_eq!(dsm.matrix.edge_count(), 20);
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let a = DsmGenerator::generate(8, 3, GenerationMode::Random, &mut SimRng::new(77)).unwrap();
        let b = DsmGenerator::generate(8, 3, GenerationMode::Random, &mut SimRng::new(77)).unwrap();
        assert_eq!(a.matrix, b.matrix);
    }
}
