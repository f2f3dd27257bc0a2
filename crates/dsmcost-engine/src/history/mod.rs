//! Run history module
pub mod store;

pub use self::store::{EvictionPolicy, RecordOutcome, RunHistory, SharedRunHistory};
