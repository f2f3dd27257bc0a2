//! # DSMCost CLI
//!
//! Batch runner for the DSM cost-evolution model. Reads parameters from the
//! environment, executes the configured runs and emits a JSON report for a
//! presentation layer to render (matrix grid, cost-history overlay).

pub mod config;
pub mod report;
pub mod runner;

pub use config::SimulatorConfig;
pub use report::{RunReport, SimulationReport};
pub use runner::BatchRunner;
