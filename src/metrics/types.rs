use serde::{Serialize, Deserialize};

use crate::types::MemoryUsage;

/// Everything the monitor has observed so far.
///
/// Optional fields stay `None` until the matching host capability reports
/// something; on hosts that lack it they stay `None` forever. Serialized
/// with the camelCase keys the dashboard reads from the persisted log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    // Web vitals
    /// First contentful paint, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp: Option<f64>,
    /// Largest contentful paint, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp: Option<f64>,
    /// First input delay, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fid: Option<f64>,
    /// Cumulative layout shift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls: Option<f64>,
    /// Time to first byte, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<f64>,

    // Overhead of the interception layer, accumulated in ms
    /// Total time spent in the interception layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_suppression_overhead: Option<f64>,
    /// Time spent in console interception
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_override_time: Option<f64>,
    /// Time spent installing the layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_listener_setup_time: Option<f64>,
    /// Time spent inspecting injected scripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_observer_time: Option<f64>,

    /// Most recent heap sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<MemoryUsage>,

    // Navigation timing
    /// DOMContentLoaded end relative to navigation start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_content_loaded: Option<f64>,
    /// Load event end relative to navigation start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_load: Option<f64>,
    /// Navigation start on the host clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_start: Option<f64>,

    // Suppression counters
    /// Swallowed console errors, rejections and error events
    #[serde(default)]
    pub suppressed_errors: u64,
    /// Swallowed console warnings
    #[serde(default)]
    pub suppressed_warnings: u64,
    /// Swallowed log, info and debug output
    #[serde(default)]
    pub suppressed_logs: u64,
    /// Requests blocked by URL
    #[serde(default)]
    pub blocked_requests: u64,
    /// Injected scripts removed
    #[serde(default)]
    pub removed_scripts: u64,

    // Jank
    /// Frame intervals over the drop threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_drops: Option<u64>,
    /// Long-task entries seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_tasks: Option<u64>,
    /// Render-blocking time, ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_blocking: Option<f64>,
}

impl MetricSnapshot {
    /// Suppressed console-style messages: errors, warnings and logs
    pub fn suppressed_messages(&self) -> u64 {
        self.suppressed_errors
            .saturating_add(self.suppressed_warnings)
            .saturating_add(self.suppressed_logs)
    }

    /// The five suppression counters on their own
    pub fn suppression_stats(&self) -> SuppressionStats {
        SuppressionStats {
            errors: self.suppressed_errors,
            warnings: self.suppressed_warnings,
            logs: self.suppressed_logs,
            blocked_requests: self.blocked_requests,
            removed_scripts: self.removed_scripts,
        }
    }
}

/// Copy of the five suppression counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionStats {
    /// Suppressed errors
    pub errors: u64,
    /// Suppressed warnings
    pub warnings: u64,
    /// Suppressed log output
    pub logs: u64,
    /// Blocked requests
    pub blocked_requests: u64,
    /// Removed scripts
    pub removed_scripts: u64,
}

impl SuppressionStats {
    /// Sum of all five counters
    pub fn total(&self) -> u64 {
        self.errors
            .saturating_add(self.warnings)
            .saturating_add(self.logs)
            .saturating_add(self.blocked_requests)
            .saturating_add(self.removed_scripts)
    }
}
