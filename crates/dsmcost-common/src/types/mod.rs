//! Core data types for the DSM cost model

pub mod cost;
pub mod matrix;
pub mod run;
