//! DSM analysis module
pub mod correlation;

pub use self::correlation::{correlation_matrix, CorrelationMatrix};
