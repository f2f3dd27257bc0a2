//! Batch execution of simulation runs
//!
//! Each run owns its DSM, cost vector and RNG fork and executes on the
//! blocking pool. Finished runs are recorded in submission order so a seeded
//! batch always yields the same report.

use std::sync::Arc;

use dsmcost_common::{DsmCostError, Result, Run, RunParameters};
use dsmcost_engine::{
    clamp_degree, generate_dsm, EngineConfig, EngineMetrics, RecordOutcome, SharedRunHistory,
    SimRng, SimulationContext, SimulationEngine,
};
use tracing::{info, instrument, warn};

use crate::config::SimulatorConfig;
use crate::report::{RunReport, SimulationReport};

pub struct BatchRunner {
    config: SimulatorConfig,
    history: SharedRunHistory,
    metrics: Arc<EngineMetrics>,
}

impl BatchRunner {
    pub fn new(config: SimulatorConfig, metrics: Arc<EngineMetrics>) -> Result<Self> {
        config.engine.validate()?;
        let history = SharedRunHistory::new(config.engine.run_history()?)
            .with_metrics(metrics.clone());
        Ok(Self {
            config,
            history,
            metrics,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn history(&self) -> &SharedRunHistory {
        &self.history
    }

    /// Execute the configured runs and report what the history retains.
    ///
    /// Each call counts as a fresh parameter submission, so a pending hard
    /// reset is lifted first.
    #[instrument(skip(self), fields(runs = self.config.runs))]
    pub async fn execute(&self) -> Result<SimulationReport> {
        self.history.resume();

        let mut master = match self.config.seed {
            Some(seed) => SimRng::new(seed),
            None => {
                let rng = SimRng::from_entropy();
                info!(
                    seed = rng.seed(),
                    "Generated random seed (replay with DSMCOST_SEED={})",
                    rng.seed()
                );
                rng
            }
        };

        let mut handles = Vec::with_capacity(self.config.runs);
        for index in 0..self.config.runs {
            let rng = master.fork();
            let engine_config = self.config.engine.clone();
            let metrics = self.metrics.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                execute_run(index, &engine_config, metrics, rng)
            }));
        }

        let mut history_reset = None;
        for handle in handles {
            let run = handle
                .await
                .map_err(|e| DsmCostError::Internal(format!("run task failed: {}", e)))??;

            // After a hard reset the remaining runs of this batch are discarded
            if history_reset.is_some() {
                continue;
            }
            if let RecordOutcome::Reset { cleared } = self.history.record(run)? {
                warn!(cleared, "Run history reset; resubmit parameters to continue");
                history_reset = Some(cleared);
            }
        }

        let (effective_degree, degree_adjustment) =
            clamp_degree(self.config.engine.components, self.config.engine.degree);
        let runs = self
            .history
            .latest(self.config.engine.history_capacity)
            .iter()
            .map(RunReport::from)
            .collect();

        Ok(SimulationReport {
            version: dsmcost_common::VERSION.to_string(),
            config: self.config.clone(),
            seed: master.seed(),
            effective_degree,
            degree_adjustment,
            runs,
            history_reset,
        })
    }
}

fn execute_run(
    index: usize,
    config: &EngineConfig,
    metrics: Arc<EngineMetrics>,
    mut rng: SimRng,
) -> Result<Run> {
    let seed = rng.seed();
    let dsm = generate_dsm(config.components, config.degree, config.mode, &mut rng)?;
    let effective_degree = dsm.effective_degree;

    let mut ctx = SimulationContext::with_initial(dsm.matrix, config.initial_costs, &mut rng)?;
    let engine = SimulationEngine::new(config.shape()?).with_metrics(metrics);
    let summary = engine.run(&mut ctx, config.steps, &mut rng)?;

    let (matrix, costs, history) = ctx.into_parts();
    info!(
        run = index,
        seed,
        final_total = history.last().unwrap_or_default(),
        "Run finished"
    );

    Ok(Run::new(
        RunParameters {
            components: config.components,
            requested_degree: config.degree,
            effective_degree,
            mode: config.mode,
            steps: u64::try_from(config.steps).unwrap_or_default(),
            exponent: config.exponent,
            seed: Some(seed),
        },
        matrix,
        costs,
        history,
        summary,
    ))
}
