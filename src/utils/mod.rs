//! Utility functions for logging and overhead profiling

mod logging;
mod profiler;

pub use logging::{setup_logging, LogConfig};
pub use profiler::OverheadTimer;
