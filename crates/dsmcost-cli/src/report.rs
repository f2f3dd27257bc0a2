//! JSON report handed to the presentation layer

use dsmcost_common::{Run, RunSummary};
use dsmcost_engine::{correlation_matrix, ParameterAdjusted};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SimulatorConfig;

/// Output of one batch invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub version: String,
    pub config: SimulatorConfig,
    /// Master seed actually used
    pub seed: u64,
    pub effective_degree: usize,
    /// Set when the requested degree was clamped
    pub degree_adjustment: Option<ParameterAdjusted>,
    /// Runs retained in the history, oldest first
    pub runs: Vec<RunReport>,
    /// Runs cleared by a hard reset, if one happened
    pub history_reset: Option<usize>,
}

/// A single retained run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub id: Uuid,
    pub seed: Option<u64>,
    pub matrix: Vec<Vec<bool>>,
    pub density: f64,
    pub mean_correlation: f64,
    pub total_cost_series: Vec<f64>,
    pub final_costs: Vec<f64>,
    pub improvement_ratio: f64,
    pub summary: RunSummary,
}

impl From<&Run> for RunReport {
    fn from(run: &Run) -> Self {
        Self {
            id: run.id,
            seed: run.parameters.seed,
            matrix: run.matrix.to_rows(),
            density: run.matrix.density(),
            mean_correlation: correlation_matrix(&run.matrix).mean_off_diagonal(),
            total_cost_series: run.history.as_slice().to_vec(),
            final_costs: run.final_costs.values().to_vec(),
            improvement_ratio: run.history.improvement_ratio(),
            summary: run.summary,
        }
    }
}
