//! Run History Storage
//!
//! Bounded, ordered storage of completed runs for side-by-side comparison.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dsmcost_common::{HistoryError, ParameterError, Result, Run};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::telemetry::EngineMetrics;

/// What happens when a record would exceed capacity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Drop the oldest run
    #[default]
    Fifo,
    /// Clear everything and refuse further records until [`RunHistory::resume`]
    HardReset,
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Fifo => write!(f, "fifo"),
            EvictionPolicy::HardReset => write!(f, "hard-reset"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = ParameterError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "hard-reset" | "hard_reset" | "reset" => Ok(EvictionPolicy::HardReset),
            other => Err(ParameterError::UnknownVariant {
                field: "history policy".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Effect of a [`RunHistory::record`] call
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    Stored,
    /// Stored, and the oldest run was evicted to make room
    Evicted(Box<Run>),
    /// History cleared; the new run was not stored
    Reset { cleared: usize },
}

/// Bounded run history
#[derive(Debug)]
pub struct RunHistory {
    /// Oldest run at the front
    runs: VecDeque<Run>,
    capacity: usize,
    policy: EvictionPolicy,
    /// Runs cleared by the last hard reset, while awaiting new parameters
    reset_pending: Option<usize>,
}

impl RunHistory {
    pub fn new(capacity: usize, policy: EvictionPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(ParameterError::ZeroCapacity.into());
        }
        Ok(Self {
            runs: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            reset_pending: None,
        })
    }

    /// Append a completed run, applying the eviction policy at the capacity boundary
    pub fn record(&mut self, run: Run) -> Result<RecordOutcome> {
        if let Some(cleared) = self.reset_pending {
            return Err(HistoryError::ResetPending { cleared }.into());
        }

        let full = self.runs.len() >= self.capacity;
        match self.policy {
            EvictionPolicy::Fifo => {
                let evicted = if full { self.runs.pop_front() } else { None };
                debug!(run_id = %run.id, retained = self.runs.len() + 1, "Run recorded");
                self.runs.push_back(run);
                Ok(match evicted {
                    Some(old) => {
                        debug!(evicted = %old.id, "Evicted oldest run");
                        RecordOutcome::Evicted(Box::new(old))
                    }
                    None => RecordOutcome::Stored,
                })
            }
            EvictionPolicy::HardReset if !full => {
                debug!(run_id = %run.id, retained = self.runs.len() + 1, "Run recorded");
                self.runs.push_back(run);
                Ok(RecordOutcome::Stored)
            }
            EvictionPolicy::HardReset => {
                let cleared = self.runs.len();
                self.runs.clear();
                self.reset_pending = Some(cleared);
                warn!(
                    cleared,
                    discarded = %run.id,
                    "Run history full; cleared and awaiting new parameters"
                );
                Ok(RecordOutcome::Reset { cleared })
            }
        }
    }

    /// Leave the awaiting-parameters state after a hard reset
    pub fn resume(&mut self) {
        if self.reset_pending.take().is_some() {
            info!("Run history resumed");
        }
    }

    pub fn is_awaiting_parameters(&self) -> bool {
        self.reset_pending.is_some()
    }

    /// Up to `k` most recent runs, oldest first
    pub fn latest(&self, k: usize) -> Vec<&Run> {
        let skip = self.runs.len().saturating_sub(k);
        self.runs.iter().skip(skip).collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Run> {
        self.runs.iter().find(|run| &run.id == id)
    }

    /// Drop every run. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.runs.len();
        self.runs.clear();
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

/// Run history shared between concurrent runs; `record` calls are serialized
#[derive(Clone)]
pub struct SharedRunHistory {
    inner: Arc<Mutex<RunHistory>>,
    metrics: Option<Arc<EngineMetrics>>,
}

impl SharedRunHistory {
    pub fn new(history: RunHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn record(&self, run: Run) -> Result<RecordOutcome> {
        let outcome = self.inner.lock().record(run)?;
        if let Some(metrics) = &self.metrics {
            match &outcome {
                RecordOutcome::Stored => metrics.runs_recorded.inc(),
                RecordOutcome::Evicted(_) => {
                    metrics.runs_recorded.inc();
                    metrics.history_evictions.inc();
                }
                RecordOutcome::Reset { .. } => metrics.history_resets.inc(),
            }
        }
        Ok(outcome)
    }

    pub fn resume(&self) {
        self.inner.lock().resume();
    }

    /// Clones of up to `k` most recent runs, oldest first
    pub fn latest(&self, k: usize) -> Vec<Run> {
        self.inner.lock().latest(k).into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn is_awaiting_parameters(&self) -> bool {
        self.inner.lock().is_awaiting_parameters()
    }
}
