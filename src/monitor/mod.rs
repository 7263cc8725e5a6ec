//! Lifecycle controller: wires the collectors, runs periodic reporting and
//! tears everything down again

mod builder;
mod monitor;

pub use builder::MonitorBuilder;
pub use monitor::{LifecycleState, PerformanceMonitor};
