//! Error types for the DSM cost model
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

/// Result type alias using DsmCostError
pub type Result<T> = std::result::Result<T, DsmCostError>;

/// Unified error type for DSM cost operations
#[derive(Debug, Error)]
pub enum DsmCostError {
    // Parameter errors: the run does not start
    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    // Run history errors
    #[error("Run history error: {0}")]
    History(#[from] HistoryError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rejected simulation or generator parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("at least 2 components are required, got {n}")]
    TooFewComponents { n: usize },

    #[error("step count must not be negative, got {steps}")]
    NegativeSteps { steps: i64 },

    #[error("{field} must be numeric, got {value:?}")]
    NonNumeric { field: String, value: String },

    #[error("shape exponent must be finite and >= 1, got {exponent}")]
    InvalidExponent { exponent: f64 },

    #[error("initial cost must be finite and positive, got {value}")]
    InvalidInitialCost { value: f64 },

    #[error("run history capacity must be at least 1")]
    ZeroCapacity,

    #[error("dependency matrix is not square ({rows} rows)")]
    NonSquareMatrix { rows: usize },

    #[error("cost vector has {costs} entries but matrix has {components} components")]
    SizeMismatch { components: usize, costs: usize },

    #[error("unknown {field} {value:?}")]
    UnknownVariant { field: String, value: String },
}

/// Run history bookkeeping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history was reset after {cleared} runs; resupply parameters before recording")]
    ResetPending { cleared: usize },
}

// Implement From for common external error types
impl From<serde_json::Error> for DsmCostError {
    fn from(err: serde_json::Error) -> Self {
        DsmCostError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DsmCostError {
    fn from(err: std::io::Error) -> Self {
        DsmCostError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for DsmCostError {
    fn from(err: anyhow::Error) -> Self {
        DsmCostError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DsmCostError::InvalidParameter(ParameterError::TooFewComponents { n: 1 });
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn test_non_numeric_names_field() {
        let err = ParameterError::NonNumeric {
            field: "DSMCOST_STEPS".to_string(),
            value: "ten".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DSMCOST_STEPS"));
        assert!(msg.contains("\"ten\""));
    }

    #[test]
    fn test_history_error_converts() {
        let err: DsmCostError = HistoryError::ResetPending { cleared: 4 }.into();
        assert!(matches!(err, DsmCostError::History(_)));
        assert!(err.to_string().contains("after 4 runs"));
    }
}
