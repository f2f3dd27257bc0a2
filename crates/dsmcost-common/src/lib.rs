//! # DSMCost Common
//!
//! Shared types, errors, and numeric helpers for the DSM cost-evolution model.
//!
//! ## Core Types
//!
//! - [`DependencyMatrix`]: Design Structure Matrix; `M[i][j]` means a change in `i` reaches `j`
//! - [`CostVector`]: per-component costs in `[COST_FLOOR, COST_CEILING]`
//! - [`CostHistory`]: total cost after every trial, initial total first
//! - [`Run`]: immutable record of one engine execution
//!
//! ## Numeric Policy
//!
//! - [`numeric::clamp_finite`]: the single place non-finite values are caught

pub mod error;
pub mod numeric;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{DsmCostError, HistoryError, ParameterError, Result};
pub use numeric::{clamp_finite, clamp_or_floor};
pub use types::{
    cost::{CostHistory, CostVector, COST_CEILING, COST_FLOOR},
    matrix::DependencyMatrix,
    run::{GenerationMode, Run, RunParameters, RunSummary},
};

/// DSMCost version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum number of components
pub const MIN_COMPONENTS: usize = 2;

/// Default number of components
pub const DEFAULT_COMPONENTS: usize = 20;

/// Default dependency degree
pub const DEFAULT_DEGREE: usize = 3;

/// Default trials per run
pub const DEFAULT_STEPS: u64 = 100;

/// Default shape exponent (plain uniform candidates)
pub const DEFAULT_EXPONENT: f64 = 1.0;

/// Default initial cost of every component
pub const DEFAULT_INITIAL_COST: f64 = 1.0;

/// Default number of runs retained for comparison
pub const DEFAULT_HISTORY_CAPACITY: usize = 4;
