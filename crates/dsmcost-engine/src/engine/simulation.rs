//! Greedy neighborhood local search over component costs
//!
//! Each trial samples a component `i`, redraws the cost of every component in
//! row `i` of the DSM and keeps the redraw only if the neighborhood sum
//! strictly drops. A trial never aborts the run: non-finite values reject the
//! proposal and the previous state stays.

use std::sync::Arc;

use dsmcost_common::{
    clamp_finite, CostHistory, CostVector, DependencyMatrix, ParameterError, Result, RunSummary,
    COST_CEILING, COST_FLOOR, DEFAULT_EXPONENT, DEFAULT_INITIAL_COST, MIN_COMPONENTS,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::telemetry::EngineMetrics;

/// Shaping of candidate costs: `candidate = u^exponent`, `u ~ U[0, 1)`.
///
/// Larger exponents push candidates toward zero. Only [`ShapeParams::new`]
/// builds one, so the exponent is always finite and at least `1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ShapeParams {
    exponent: f64,
}

impl ShapeParams {
    pub fn new(exponent: f64) -> Result<Self> {
        if !exponent.is_finite() || exponent < 1.0 {
            return Err(ParameterError::InvalidExponent { exponent }.into());
        }
        Ok(Self { exponent })
    }

    #[inline]
    pub fn exponent(&self) -> f64 {
        self.exponent
    }
}

impl TryFrom<f64> for ShapeParams {
    type Error = dsmcost_common::DsmCostError;

    fn try_from(exponent: f64) -> Result<Self> {
        Self::new(exponent)
    }
}

impl From<ShapeParams> for f64 {
    fn from(shape: ShapeParams) -> Self {
        shape.exponent
    }
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_EXPONENT,
        }
    }
}

/// How the cost vector is seeded before the first trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialCosts {
    /// Every component starts at the same cost
    Uniform(f64),
    /// Independent uniform draws, clamped to the floor
    Random,
}

impl Default for InitialCosts {
    fn default() -> Self {
        InitialCosts::Uniform(DEFAULT_INITIAL_COST)
    }
}

impl InitialCosts {
    pub fn validate(&self) -> Result<()> {
        match *self {
            InitialCosts::Uniform(value) if !value.is_finite() || value <= 0.0 => {
                Err(ParameterError::InvalidInitialCost { value }.into())
            }
            _ => Ok(()),
        }
    }

    pub fn build<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> CostVector {
        match *self {
            InitialCosts::Uniform(value) => CostVector::uniform(n, value),
            InitialCosts::Random => CostVector::from_values((0..n).map(|_| rng.gen::<f64>())),
        }
    }
}

/// Caller-owned state of one run: the DSM, the live costs, and the totals so far.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    matrix: DependencyMatrix,
    costs: CostVector,
    history: CostHistory,
}

impl SimulationContext {
    /// Start a run from explicit costs. The history is seeded with the initial total.
    pub fn new(matrix: DependencyMatrix, costs: CostVector) -> Result<Self> {
        if matrix.len() < MIN_COMPONENTS {
            return Err(ParameterError::TooFewComponents { n: matrix.len() }.into());
        }
        if matrix.len() != costs.len() {
            return Err(ParameterError::SizeMismatch {
                components: matrix.len(),
                costs: costs.len(),
            }
            .into());
        }
        let mut history = CostHistory::new();
        history.push(costs.total());
        Ok(Self {
            matrix,
            costs,
            history,
        })
    }

    pub fn with_initial<R: Rng + ?Sized>(
        matrix: DependencyMatrix,
        initial: InitialCosts,
        rng: &mut R,
    ) -> Result<Self> {
        initial.validate()?;
        let costs = initial.build(matrix.len(), rng);
        Self::new(matrix, costs)
    }

    pub fn matrix(&self) -> &DependencyMatrix {
        &self.matrix
    }

    pub fn costs(&self) -> &CostVector {
        &self.costs
    }

    pub fn history(&self) -> &CostHistory {
        &self.history
    }

    /// Current total cost
    pub fn total(&self) -> f64 {
        self.costs.total()
    }

    pub fn into_parts(self) -> (DependencyMatrix, CostVector, CostHistory) {
        (self.matrix, self.costs, self.history)
    }
}

/// Result of a single trial
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    /// Sampled component has no neighborhood
    NoOp { component: usize },
    Accepted {
        component: usize,
        neighborhood: Vec<usize>,
        before: f64,
        after: f64,
    },
    Rejected {
        component: usize,
        neighborhood: Vec<usize>,
        before: f64,
        /// `None` when the proposal held a non-finite value
        proposed: Option<f64>,
    },
}

impl TrialOutcome {
    pub fn component(&self) -> usize {
        match self {
            TrialOutcome::NoOp { component }
            | TrialOutcome::Accepted { component, .. }
            | TrialOutcome::Rejected { component, .. } => *component,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, TrialOutcome::Accepted { .. })
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, TrialOutcome::Rejected { proposed: None, .. })
    }
}

/// Stateless driver; all run state lives in the [`SimulationContext`]
#[derive(Clone, Default)]
pub struct SimulationEngine {
    shape: ShapeParams,
    metrics: Option<Arc<EngineMetrics>>,
}

impl SimulationEngine {
    pub fn new(shape: ShapeParams) -> Self {
        Self {
            shape,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn shape(&self) -> ShapeParams {
        self.shape
    }

    /// Execute one trial and append the post-trial total to the history
    pub fn trial<R: Rng + ?Sized>(
        &self,
        ctx: &mut SimulationContext,
        rng: &mut R,
    ) -> TrialOutcome {
        let n = ctx.matrix.len();
        let component = rng.gen_range(0..n);
        let neighborhood = ctx.matrix.neighborhood(component);

        let outcome = if neighborhood.is_empty() {
            TrialOutcome::NoOp { component }
        } else {
            self.propose(ctx, component, neighborhood, rng)
        };

        let total = clamp_finite(ctx.costs.total(), 0.0, f64::MAX)
            .or_else(|| ctx.history.last())
            .unwrap_or(COST_FLOOR * n as f64);
        ctx.history.push(total);

        outcome
    }

    fn propose<R: Rng + ?Sized>(
        &self,
        ctx: &mut SimulationContext,
        component: usize,
        neighborhood: Vec<usize>,
        rng: &mut R,
    ) -> TrialOutcome {
        let before = ctx.costs.sum_of(&neighborhood);

        let mut candidates = Vec::with_capacity(neighborhood.len());
        let mut anomaly = false;
        for _ in &neighborhood {
            let raw = rng.gen::<f64>().powf(self.shape.exponent);
            match clamp_finite(raw, COST_FLOOR, COST_CEILING) {
                Some(c) => candidates.push(c),
                None => anomaly = true,
            }
        }

        let proposed = if anomaly {
            None
        } else {
            clamp_finite(candidates.iter().sum(), 0.0, f64::MAX)
        };

        match proposed {
            Some(after) if after < before && ctx.costs.commit(&neighborhood, &candidates) => {
                TrialOutcome::Accepted {
                    component,
                    neighborhood,
                    before,
                    after,
                }
            }
            Some(after) => TrialOutcome::Rejected {
                component,
                neighborhood,
                before,
                proposed: Some(after),
            },
            None => {
                debug!(component, "Discarded non-finite proposal");
                TrialOutcome::Rejected {
                    component,
                    neighborhood,
                    before,
                    proposed: None,
                }
            }
        }
    }

    /// Run `steps` trials to completion.
    ///
    /// `steps < 0` is rejected before any trial; `steps == 0` leaves only the
    /// initial total in the history.
    pub fn run<R: Rng + ?Sized>(
        &self,
        ctx: &mut SimulationContext,
        steps: i64,
        rng: &mut R,
    ) -> Result<RunSummary> {
        self.run_observed(ctx, steps, rng, |_| {})
    }

    /// Like [`SimulationEngine::run`], handing every trial outcome to `observe`
    #[instrument(skip(self, ctx, rng, observe), fields(components = ctx.matrix.len()))]
    pub fn run_observed<R, F>(
        &self,
        ctx: &mut SimulationContext,
        steps: i64,
        rng: &mut R,
        mut observe: F,
    ) -> Result<RunSummary>
    where
        R: Rng + ?Sized,
        F: FnMut(&TrialOutcome),
    {
        if steps < 0 {
            return Err(ParameterError::NegativeSteps { steps }.into());
        }

        let initial_total = ctx.total();
        let mut summary = RunSummary::default();

        for _ in 0..steps {
            let outcome = self.trial(ctx, rng);
            match &outcome {
                TrialOutcome::NoOp { .. } => summary.no_ops += 1,
                TrialOutcome::Accepted { .. } => summary.accepted += 1,
                TrialOutcome::Rejected { proposed, .. } => {
                    summary.rejected += 1;
                    if proposed.is_none() {
                        summary.numeric_anomalies += 1;
                    }
                }
            }
            observe(&outcome);
        }

        let final_total = ctx.history.last().unwrap_or(initial_total);
        if let Some(metrics) = &self.metrics {
            metrics.observe_run(&summary, final_total);
        }

        info!(
            steps,
            accepted = summary.accepted,
            rejected = summary.rejected,
            no_ops = summary.no_ops,
            initial_total,
            final_total,
            "Simulation run complete"
        );

        Ok(summary)
    }
}
