//! Prometheus metrics for the engine and run history

use prometheus::{Gauge, IntCounter, Registry};

use dsmcost_common::RunSummary;

/// Prometheus metrics for simulation runs
#[derive(Clone)]
pub struct EngineMetrics {
    pub trials_accepted: IntCounter,
    pub trials_rejected: IntCounter,
    pub trials_noop: IntCounter,
    pub numeric_anomalies: IntCounter,
    pub runs_completed: IntCounter,
    pub runs_recorded: IntCounter,
    pub history_evictions: IntCounter,
    pub history_resets: IntCounter,
    pub last_total_cost: Gauge,
}

impl EngineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            trials_accepted: IntCounter::new(
                "dsmcost_trials_accepted_total",
                "Trials whose neighborhood proposal was accepted",
            )?,
            trials_rejected: IntCounter::new(
                "dsmcost_trials_rejected_total",
                "Trials whose neighborhood proposal was discarded",
            )?,
            trials_noop: IntCounter::new(
                "dsmcost_trials_noop_total",
                "Trials that sampled a component with an empty neighborhood",
            )?,
            numeric_anomalies: IntCounter::new(
                "dsmcost_numeric_anomalies_total",
                "Proposals discarded because a value was non-finite",
            )?,
            runs_completed: IntCounter::new(
                "dsmcost_runs_completed_total",
                "Simulation runs executed to completion",
            )?,
            runs_recorded: IntCounter::new(
                "dsmcost_runs_recorded_total",
                "Runs stored in the run history",
            )?,
            history_evictions: IntCounter::new(
                "dsmcost_history_evictions_total",
                "Runs evicted from the run history",
            )?,
            history_resets: IntCounter::new(
                "dsmcost_history_resets_total",
                "Hard resets of the run history",
            )?,
            last_total_cost: Gauge::new(
                "dsmcost_last_total_cost",
                "Final total cost of the most recent run",
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.trials_accepted.clone()))?;
        registry.register(Box::new(self.trials_rejected.clone()))?;
        registry.register(Box::new(self.trials_noop.clone()))?;
        registry.register(Box::new(self.numeric_anomalies.clone()))?;
        registry.register(Box::new(self.runs_completed.clone()))?;
        registry.register(Box::new(self.runs_recorded.clone()))?;
        registry.register(Box::new(self.history_evictions.clone()))?;
        registry.register(Box::new(self.history_resets.clone()))?;
        registry.register(Box::new(self.last_total_cost.clone()))?;
        Ok(())
    }

    /// Fold a finished run's counts into the counters
    pub fn observe_run(&self, summary: &RunSummary, final_total: f64) {
        self.trials_accepted.inc_by(summary.accepted);
        self.trials_rejected.inc_by(summary.rejected);
        self.trials_noop.inc_by(summary.no_ops);
        self.numeric_anomalies.inc_by(summary.numeric_anomalies);
        self.runs_completed.inc();
        self.last_total_cost.set(final_total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_observe() {
        let registry = Registry::new();
        let metrics = EngineMetrics::new().unwrap();
        metrics.register(&registry).unwrap();

        metrics.observe_run(
            &RunSummary {
                accepted: 3,
                rejected: 5,
                no_ops: 1,
                numeric_anomalies: 0,
            },
            4.25,
        );

        assert_eq!(metrics.trials_accepted.get(), 3);
        assert_eq!(metrics.trials_rejected.get(), 5);
        assert_eq!(metrics.runs_completed.get(), 1);
        assert_eq!(metrics.last_total_cost.get(), 4.25);
        assert_eq!(registry.gather().len(), 9);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        let metrics = EngineMetrics::new().unwrap();
        metrics.register(&registry).unwrap();
        assert!(metrics.register(&registry).is_err());
    }
}
