//! Run - one completed engine execution for a fixed parameter set
//!
//! Runs are immutable once built; the Run History only moves them around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::cost::{CostHistory, CostVector};
use super::matrix::DependencyMatrix;
use crate::error::ParameterError;

/// How the DSM generator picks each row's off-diagonal targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Exactly `d` targets per row
    #[default]
    Fixed,
    /// `Uniform{1..=d}` targets per row
    Random,
    /// Each off-diagonal cell set with probability `1/d`, empty diagonal
    Probability,
}

impl GenerationMode {
    /// Degree modes set the diagonal and honor the out-degree invariant
    pub fn is_degree_based(&self) -> bool {
        !matches!(self, GenerationMode::Probability)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Fixed => write!(f, "fixed"),
            GenerationMode::Random => write!(f, "random"),
            GenerationMode::Probability => write!(f, "probability"),
        }
    }
}

impl FromStr for GenerationMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(GenerationMode::Fixed),
            "random" => Ok(GenerationMode::Random),
            "probability" | "prob" => Ok(GenerationMode::Probability),
            other => Err(ParameterError::UnknownVariant {
                field: "generation mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Parameters a run was executed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Number of components `n`
    pub components: usize,
    /// Degree the caller asked for
    pub requested_degree: usize,
    /// Degree after clamping into `[1, n-1]`
    pub effective_degree: usize,
    pub mode: GenerationMode,
    pub steps: u64,
    pub exponent: f64,
    /// Seed of the run's RNG, when it was seeded
    pub seed: Option<u64>,
}

/// Trial outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub accepted: u64,
    pub rejected: u64,
    pub no_ops: u64,
    /// Proposals discarded because a candidate or sum was non-finite
    pub numeric_anomalies: u64,
}

impl RunSummary {
    pub fn trials(&self) -> u64 {
        self.accepted + self.rejected + self.no_ops
    }

    /// Fraction of trials that changed the cost vector
    pub fn acceptance_rate(&self) -> f64 {
        match self.trials() {
            0 => 0.0,
            t => self.accepted as f64 / t as f64,
        }
    }
}

/// A recorded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub parameters: RunParameters,
    pub matrix: DependencyMatrix,
    pub final_costs: CostVector,
    pub history: CostHistory,
    pub summary: RunSummary,
    pub recorded_at: DateTime<Utc>,
}

impl Run {
    pub fn new(
        parameters: RunParameters,
        matrix: DependencyMatrix,
        final_costs: CostVector,
        history: CostHistory,
        summary: RunSummary,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            parameters,
            matrix,
            final_costs,
            history,
            summary,
            recorded_at: Utc::now(),
        }
    }

    /// Last total-cost snapshot
    pub fn final_total(&self) -> Option<f64> {
        self.history.last()
    }
}
