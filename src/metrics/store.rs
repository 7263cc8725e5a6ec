use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::types::{MetricSnapshot, SuppressionStats};
use crate::{
    suppression::SuppressionSink,
    types::{MemoryUsage, NavigationTiming, SuppressionKind, TimingKind},
};

/// Live holder of the monitor's [`MetricSnapshot`].
///
/// Sample fields sit behind one mutex. Suppression counters are atomics so
/// that recording one never waits on a lock; the caller is usually inside a
/// logging or error path. Once [`mark_destroyed`](Self::mark_destroyed) has
/// run, every write is ignored.
#[derive(Debug, Default)]
pub struct MetricStore {
    state: Mutex<MetricSnapshot>,
    suppression: SuppressionCounters,
    destroyed: AtomicBool,
}

#[derive(Debug, Default)]
struct SuppressionCounters {
    errors: AtomicU64,
    warnings: AtomicU64,
    logs: AtomicU64,
    blocked_requests: AtomicU64,
    removed_scripts: AtomicU64,
}

impl SuppressionCounters {
    fn counter(&self, kind: SuppressionKind) -> &AtomicU64 {
        match kind {
            SuppressionKind::Error => &self.errors,
            SuppressionKind::Warning => &self.warnings,
            SuppressionKind::Log => &self.logs,
            SuppressionKind::Request => &self.blocked_requests,
            SuppressionKind::Script => &self.removed_scripts,
        }
    }

    fn stats(&self) -> SuppressionStats {
        SuppressionStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            logs: self.logs.load(Ordering::Relaxed),
            blocked_requests: self.blocked_requests.load(Ordering::Relaxed),
            removed_scripts: self.removed_scripts.load(Ordering::Relaxed),
        }
    }
}

impl MetricStore {
    /// Empty store in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state
    pub fn get(&self) -> MetricSnapshot {
        let mut snapshot = self.state.lock().clone();
        let stats = self.suppression.stats();
        snapshot.suppressed_errors = stats.errors;
        snapshot.suppressed_warnings = stats.warnings;
        snapshot.suppressed_logs = stats.logs;
        snapshot.blocked_requests = stats.blocked_requests;
        snapshot.removed_scripts = stats.removed_scripts;
        snapshot
    }

    /// Copy of the suppression counters
    pub fn suppression_stats(&self) -> SuppressionStats {
        self.suppression.stats()
    }

    /// Whether writes are being ignored
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Flip to destroyed. Returns false if it already was.
    pub(crate) fn mark_destroyed(&self) -> bool {
        !self.destroyed.swap(true, Ordering::AcqRel)
    }

    fn update(&self, apply: impl FnOnce(&mut MetricSnapshot)) {
        if self.is_destroyed() {
            return;
        }
        apply(&mut *self.state.lock());
    }

    pub(crate) fn set_fcp(&self, value: f64) {
        self.update(|m| m.fcp = Some(value));
    }

    pub(crate) fn set_lcp(&self, value: f64) {
        self.update(|m| m.lcp = Some(value));
    }

    pub(crate) fn set_fid(&self, value: f64) {
        self.update(|m| m.fid = Some(value));
    }

    pub(crate) fn add_layout_shift(&self, shift: f64) {
        self.update(|m| m.cls = Some(m.cls.unwrap_or(0.0) + shift));
    }

    pub(crate) fn set_navigation(&self, timing: &NavigationTiming) {
        self.update(|m| {
            m.ttfb = Some(timing.response_start - timing.request_start);
            m.dom_content_loaded = Some(timing.dom_content_loaded_event_end - timing.navigation_start);
            m.window_load = Some(timing.load_event_end - timing.navigation_start);
            m.navigation_start = Some(timing.navigation_start);
        });
    }

    pub(crate) fn set_memory(&self, memory: MemoryUsage) {
        self.update(|m| m.memory_usage = Some(memory));
    }

    pub(crate) fn add_long_tasks(&self, count: u64) {
        self.update(|m| m.long_tasks = Some(m.long_tasks.unwrap_or(0).saturating_add(count)));
    }

    pub(crate) fn record_frame(&self, dropped: bool) {
        self.update(|m| m.frame_drops = Some(m.frame_drops.unwrap_or(0).saturating_add(u64::from(dropped))));
    }

    pub(crate) fn add_timing(&self, kind: TimingKind, millis: f64) {
        if !millis.is_finite() || millis < 0.0 {
            return;
        }

        self.update(|m| {
            let field = match kind {
                TimingKind::ConsoleOverride => &mut m.console_override_time,
                TimingKind::MutationObserver => &mut m.mutation_observer_time,
                TimingKind::EventListenerSetup => &mut m.event_listener_setup_time,
                TimingKind::ErrorSuppression => &mut m.error_suppression_overhead,
                TimingKind::RenderBlocking => &mut m.render_blocking,
            };
            *field = Some(field.unwrap_or(0.0) + millis);

            // Interception work also counts toward the aggregate overhead
            if matches!(
                kind,
                TimingKind::ConsoleOverride | TimingKind::MutationObserver | TimingKind::EventListenerSetup
            ) {
                m.error_suppression_overhead = Some(m.error_suppression_overhead.unwrap_or(0.0) + millis);
            }
        });
    }
}

impl SuppressionSink for MetricStore {
    fn record_suppression(&self, kind: SuppressionKind) {
        if self.is_destroyed() {
            return;
        }
        self.suppression.counter(kind).fetch_add(1, Ordering::Relaxed);
    }

    fn record_overhead(&self, kind: TimingKind, elapsed: Duration) {
        self.add_timing(kind, elapsed.as_secs_f64() * 1000.0);
    }
}
