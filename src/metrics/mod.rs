//! Live metric state and the snapshot type handed to readers

mod store;
mod types;

pub use store::MetricStore;
pub use types::{MetricSnapshot, SuppressionStats};
