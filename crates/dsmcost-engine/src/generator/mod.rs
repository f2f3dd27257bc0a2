//! DSM generator module
pub mod dsm;

pub use self::dsm::{clamp_degree, DsmGenerator, GeneratedDsm, ParameterAdjusted};
