//! Simulation engine module
pub mod simulation;

pub use self::simulation::{
    InitialCosts, ShapeParams, SimulationContext, SimulationEngine, TrialOutcome,
};
