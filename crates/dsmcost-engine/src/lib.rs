//! # DSMCost Engine
//!
//! Stochastic cost-evolution engine driven by a Design Structure Matrix.
//!
//! ## Trial Rule
//!
//! ```text
//! i      ~ U{0..n}
//! A_i    = { j | M[i][j] }
//! c'_j   = clamp(u_j ^ k, 1e-4, 1)    for j in A_i
//! accept   iff  Σ c'_j < Σ c_j
//! ```
//!
//! Where:
//! - M: dependency matrix, `M[i][j]` means a change in `i` reaches `j`
//! - k: shape exponent (>= 1)
//! - c: current component costs
//!
//! ## Run History
//!
//! The last few runs are retained for comparison, FIFO by default.

pub mod analysis;
pub mod engine;
pub mod generator;
pub mod history;
pub mod rng;
pub mod telemetry;

use dsmcost_common::{
    CostHistory, DependencyMatrix, GenerationMode, ParameterError, Result, DEFAULT_COMPONENTS,
    DEFAULT_DEGREE, DEFAULT_EXPONENT, DEFAULT_HISTORY_CAPACITY, DEFAULT_STEPS,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use analysis::{correlation_matrix, CorrelationMatrix};
pub use engine::{InitialCosts, ShapeParams, SimulationContext, SimulationEngine, TrialOutcome};
pub use generator::{clamp_degree, DsmGenerator, GeneratedDsm, ParameterAdjusted};
pub use history::{EvictionPolicy, RecordOutcome, RunHistory, SharedRunHistory};
pub use rng::SimRng;
pub use telemetry::EngineMetrics;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of components
    pub components: usize,
    /// Requested dependency degree (clamped into `[1, n-1]`)
    pub degree: usize,
    /// DSM generation mode
    pub mode: GenerationMode,
    /// Trials per run
    pub steps: i64,
    /// Candidate shape exponent
    pub exponent: f64,
    /// Initial cost vector
    pub initial_costs: InitialCosts,
    /// Runs retained for comparison
    pub history_capacity: usize,
    /// Policy when the history is full
    pub history_policy: EvictionPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            components: DEFAULT_COMPONENTS,
            degree: DEFAULT_DEGREE,
            mode: GenerationMode::Fixed,
            steps: DEFAULT_STEPS as i64,
            exponent: DEFAULT_EXPONENT,
            initial_costs: InitialCosts::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_policy: EvictionPolicy::Fifo,
        }
    }
}

impl EngineConfig {
    /// Reject parameters that would stop a run from starting
    pub fn validate(&self) -> Result<()> {
        if self.components < dsmcost_common::MIN_COMPONENTS {
            return Err(ParameterError::TooFewComponents {
                n: self.components,
            }
            .into());
        }
        if self.steps < 0 {
            return Err(ParameterError::NegativeSteps { steps: self.steps }.into());
        }
        if self.history_capacity == 0 {
            return Err(ParameterError::ZeroCapacity.into());
        }
        ShapeParams::new(self.exponent)?;
        self.initial_costs.validate()
    }

    pub fn shape(&self) -> Result<ShapeParams> {
        ShapeParams::new(self.exponent)
    }

    pub fn run_history(&self) -> Result<RunHistory> {
        RunHistory::new(self.history_capacity, self.history_policy)
    }
}

/// Generate a DSM; `d` is clamped and the adjustment reported
pub fn generate_dsm<R: Rng + ?Sized>(
    n: usize,
    d: usize,
    mode: GenerationMode,
    rng: &mut R,
) -> Result<GeneratedDsm> {
    DsmGenerator::generate(n, d, mode, rng)
}

/// Run `steps` trials on `matrix` from the default initial costs.
///
/// Returns `steps + 1` totals, the initial total first.
pub fn run_simulation<R: Rng + ?Sized>(
    matrix: &DependencyMatrix,
    steps: i64,
    shape: ShapeParams,
    rng: &mut R,
) -> Result<CostHistory> {
    let mut ctx = SimulationContext::with_initial(matrix.clone(), InitialCosts::default(), rng)?;
    SimulationEngine::new(shape).run(&mut ctx, steps, rng)?;
    let (_, _, history) = ctx.into_parts();
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.run_history().unwrap().capacity(), 4);
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let mut config = EngineConfig {
            components: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.components = 5;
        config.steps = -3;
        assert!(config.validate().is_err());

        config.steps = 10;
        config.exponent = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_simulation_series_length() {
        let mut rng = SimRng::new(17);
        let dsm = generate_dsm(3, 1, GenerationMode::Fixed, &mut rng).unwrap();

        let series = run_simulation(&dsm.matrix, 0, ShapeParams::default(), &mut rng).unwrap();
        assert_eq!(series.as_slice(), &[3.0]);

        let series = run_simulation(&dsm.matrix, 1, ShapeParams::default(), &mut rng).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.as_slice()[1] <= series.as_slice()[0]);
    }

    #[test]
    fn test_run_simulation_rejects_degenerate_matrix() {
        let mut rng = SimRng::new(2);
        for matrix in [DependencyMatrix::empty(0), DependencyMatrix::identity(1)] {
            let err = run_simulation(&matrix, 3, ShapeParams::default(), &mut rng).unwrap_err();
            assert!(err.to_string().contains("at least 2"), "{}", err);
        }
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let run = |seed| {
            let mut rng = SimRng::new(seed);
            let dsm = generate_dsm(12, 3, GenerationMode::Random, &mut rng).unwrap();
            run_simulation(&dsm.matrix, 200, ShapeParams::default(), &mut rng).unwrap()
        };
        assert_eq!(run(123), run(123));
    }
}
