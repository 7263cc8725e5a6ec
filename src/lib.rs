//! FightConnect performance monitor
//!
//! Observes page performance signals delivered by a host environment (paint
//! timings, input delay, layout shifts, long tasks, frame timing, memory),
//! counts what the extension-error suppression layer swallows, and turns
//! both into periodic reports with an impact score and recommendations.
//!
//! ```no_run
//! # fn host() -> std::sync::Arc<dyn fightconnect_perf::PerformanceHost> { unimplemented!() }
//! use fightconnect_perf::MonitorBuilder;
//!
//! let monitor = MonitorBuilder::new().with_host(host()).start()?;
//! let report = monitor.generate_report();
//! println!("impact {}", report.impact_score);
//! # Ok::<(), fightconnect_perf::MonitorError>(())
//! ```

#![warn(missing_docs)]

// Public modules
pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod storage;
pub mod suppression;
pub mod types;
pub mod utils;

// Internal modules
mod collectors;

// Version information
/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-exports for public API
pub use config::{MonitorConfig, ReportingConfig, SamplingConfig, SuppressionConfig};
pub use error::{MonitorError, Result};
pub use host::{PerformanceHost, Subscription};
pub use metrics::{MetricSnapshot, SuppressionStats};
pub use monitor::{LifecycleState, MonitorBuilder, PerformanceMonitor};
pub use report::{ImpactLevel, PerformanceReport};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, ReportLog};
pub use suppression::{ConsoleLevel, KeywordFilter, SuppressionLayer, SuppressionSink, Verdict};
pub use types::{EntryType, MemoryUsage, NavigationTiming, PageEvent, PerformanceEntry, SuppressionKind, TimingKind};
pub use utils::{setup_logging, LogConfig};
