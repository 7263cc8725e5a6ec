//! Common type definitions shared by the host seam and the collectors

use serde::{Serialize, Deserialize};

/// Performance observation streams a host may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryType {
    /// Paint timings (`first-paint`, `first-contentful-paint`)
    Paint,
    /// Largest contentful paint candidates
    LargestContentfulPaint,
    /// First user input
    FirstInput,
    /// Layout shifts
    LayoutShift,
    /// Tasks blocking the main thread for over 50 ms
    #[serde(rename = "longtask")]
    LongTask,
}

impl EntryType {
    /// Name used by the platform's performance timeline
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Paint => "paint",
            EntryType::LargestContentfulPaint => "largest-contentful-paint",
            EntryType::FirstInput => "first-input",
            EntryType::LayoutShift => "layout-shift",
            EntryType::LongTask => "longtask",
        }
    }
}

/// One entry delivered by an observation stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceEntry {
    /// Entry name
    pub name: String,
    /// Start on the host clock, ms
    pub start_time: f64,
    /// Duration, ms
    pub duration: f64,
    /// First-input entries only
    pub processing_start: Option<f64>,
    /// Layout-shift entries only
    pub value: Option<f64>,
    /// Layout-shift entries only
    pub had_recent_input: bool,
}

impl PerformanceEntry {
    /// A paint entry
    pub fn paint(name: impl Into<String>, start_time: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
            ..Default::default()
        }
    }

    /// An LCP candidate rendered at `start_time`
    pub fn largest_contentful_paint(start_time: f64) -> Self {
        Self {
            start_time,
            ..Default::default()
        }
    }

    /// A first-input entry
    pub fn first_input(start_time: f64, processing_start: f64) -> Self {
        Self {
            name: "pointerdown".to_string(),
            start_time,
            processing_start: Some(processing_start),
            ..Default::default()
        }
    }

    /// A layout-shift entry
    pub fn layout_shift(value: f64, had_recent_input: bool) -> Self {
        Self {
            value: Some(value),
            had_recent_input,
            ..Default::default()
        }
    }

    /// A long-task entry
    pub fn long_task(start_time: f64, duration: f64) -> Self {
        Self {
            name: "self".to_string(),
            start_time,
            duration,
            ..Default::default()
        }
    }
}

/// Navigation timing marks, all relative to the time origin in ms
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavigationTiming {
    /// Navigation started
    pub navigation_start: f64,
    /// Document request sent
    pub request_start: f64,
    /// First response byte
    pub response_start: f64,
    /// DOMContentLoaded handlers finished
    pub dom_content_loaded_event_end: f64,
    /// Load handlers finished
    pub load_event_end: f64,
}

/// Heap usage as reported by the host, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Heap in use
    pub used: u64,
    /// Heap allocated
    pub total: u64,
    /// Heap ceiling
    pub limit: u64,
}

impl MemoryUsage {
    /// used / limit, or None when the host reports no limit
    pub fn usage_ratio(&self) -> Option<f64> {
        if self.limit == 0 {
            return None;
        }
        Some(self.used as f64 / self.limit as f64)
    }
}

/// Page lifecycle events the monitor listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageEvent {
    /// Document finished loading
    Load,
    /// Page hidden or frozen
    PageHide,
    /// Page about to unload
    BeforeUnload,
}

/// What the interception layer swallowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionKind {
    /// Console error, rejection or error event
    Error,
    /// Console warning
    Warning,
    /// Log, info or debug output
    Log,
    /// Blocked request
    Request,
    /// Removed script
    Script,
}

/// Custom overhead timings accumulated by the interception layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingKind {
    /// Console interception
    ConsoleOverride,
    /// Script inspection
    MutationObserver,
    /// Installing the layer
    EventListenerSetup,
    /// Error, rejection and request interception
    ErrorSuppression,
    /// Render-blocking work
    RenderBlocking,
}
