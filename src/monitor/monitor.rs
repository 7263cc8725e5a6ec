use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};

use crate::{
    collectors,
    config::MonitorConfig,
    host::{PerformanceHost, Subscription},
    metrics::{MetricSnapshot, MetricStore, SuppressionStats},
    report::{generate_session_id, PerformanceReport},
    storage::{KeyValueStore, ReportLog},
    suppression::{SuppressionLayer, SuppressionSink},
    types::{PageEvent, SuppressionKind, TimingKind},
};

/// Lifecycle of a [`PerformanceMonitor`]. A monitor is `Running` from the
/// moment it is constructed until `destroy` moves it to `Destroyed`, which
/// is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Collecting and reporting
    Running,
    /// Torn down; every write is ignored
    Destroyed,
}

/// Everything report generation needs; shared with the background task and
/// the page-hide listeners through weak references.
struct ReportContext {
    host: Arc<dyn PerformanceHost>,
    store: Arc<MetricStore>,
    log: ReportLog,
    session_id: String,
}

impl ReportContext {
    fn generate(&self) -> PerformanceReport {
        collectors::sample_memory(self.host.as_ref(), &self.store);

        PerformanceReport::capture(
            self.store.get(),
            self.session_id.clone(),
            self.host.user_agent(),
            self.host.suppression_active(),
        )
    }

    fn generate_and_store(&self) {
        if self.store.is_destroyed() {
            return;
        }
        let report = self.generate();
        self.log.append(&report);
        debug!(
            session_id = %self.session_id,
            key = self.log.key(),
            impact_score = report.impact_score,
            "performance report stored"
        );
    }
}

/// Background task that writes a report every interval
struct PeriodicReporter {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl PeriodicReporter {
    fn spawn(runtime: &tokio::runtime::Handle, context: Weak<ReportContext>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Periodic reporter received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(context) = context.upgrade() else { break };
                        if context.store.is_destroyed() {
                            break;
                        }
                        context.generate_and_store();
                    }
                }
            }
        });

        Self {
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

/// Process-wide performance observer.
///
/// Construct one at application bootstrap (see [`MonitorBuilder`](super::MonitorBuilder))
/// and hand it to whatever needs to read it. It wires every collector on
/// start, writes a report to the persisted log every interval and on page
/// hide or unload, and tears everything down on [`destroy`](Self::destroy)
/// or drop.
pub struct PerformanceMonitor {
    config: Arc<MonitorConfig>,
    context: Arc<ReportContext>,
    subscriptions: Mutex<Vec<Subscription>>,
    reporter: Mutex<Option<PeriodicReporter>>,
}

impl PerformanceMonitor {
    /// Validate the configuration and enter the running state.
    ///
    /// The periodic reporter needs a tokio runtime; without one the monitor
    /// still collects and reports on demand.
    pub fn start(
        config: MonitorConfig,
        host: Arc<dyn PerformanceHost>,
        storage: Arc<dyn KeyValueStore>,
    ) -> crate::Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let store = Arc::new(MetricStore::new());
        let log = ReportLog::new(
            storage,
            config.reporting.storage_key.clone(),
            config.reporting.max_stored_reports,
        );
        let context = Arc::new(ReportContext {
            host: host.clone(),
            store: store.clone(),
            log,
            session_id: generate_session_id(&config.reporting.session_prefix),
        });

        let mut subscriptions = Vec::new();
        collectors::attach_web_vitals(&host, &store, &mut subscriptions);
        collectors::sample_memory(host.as_ref(), &store);
        collectors::attach_long_tasks(host.as_ref(), &store, &mut subscriptions);
        if config.sampling.track_frames {
            collectors::attach_frame_monitor(
                host.as_ref(),
                &store,
                config.sampling.frame_drop_threshold_ms,
                &mut subscriptions,
            );
        }
        if config.reporting.report_on_unload {
            attach_unload_reports(host.as_ref(), &context, &mut subscriptions);
        }

        let reporter = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(PeriodicReporter::spawn(
                &runtime,
                Arc::downgrade(&context),
                config.reporting.interval,
            )),
            Err(_) => {
                warn!("No tokio runtime available, periodic reports disabled");
                None
            }
        };

        info!(
            session_id = %context.session_id,
            subscriptions = subscriptions.len(),
            periodic = reporter.is_some(),
            "Performance monitor started"
        );

        Ok(Self {
            config,
            context,
            subscriptions: Mutex::new(subscriptions),
            reporter: Mutex::new(reporter),
        })
    }

    /// Copy of the live metrics
    pub fn metrics(&self) -> MetricSnapshot {
        self.context.store.get()
    }

    /// Copy of the suppression counters
    pub fn suppression_stats(&self) -> SuppressionStats {
        self.context.store.suppression_stats()
    }

    /// Build a report from the current state with a fresh memory sample.
    /// Does not persist it.
    pub fn generate_report(&self) -> PerformanceReport {
        self.context.generate()
    }

    /// Reports in the persisted log, oldest first
    pub fn stored_reports(&self) -> Vec<PerformanceReport> {
        self.context.log.load()
    }

    /// Count one swallowed item
    pub fn record_suppression(&self, kind: SuppressionKind) {
        self.context.store.record_suppression(kind);
    }

    /// The store as a capability for an interception layer
    pub fn suppression_sink(&self) -> Arc<dyn SuppressionSink> {
        self.context.store.clone()
    }

    /// An interception layer configured from this monitor's settings and
    /// counting into it
    pub fn suppression_layer(&self) -> SuppressionLayer {
        SuppressionLayer::from_config(&self.config.suppression, self.suppression_sink())
    }

    /// Identifier stamped on every report from this monitor
    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    /// Configuration the monitor was started with
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        if self.context.store.is_destroyed() {
            LifecycleState::Destroyed
        } else {
            LifecycleState::Running
        }
    }

    /// Shorthand for `state() == Destroyed`
    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }

    /// Stop the periodic reporter and cancel every subscription. Safe to
    /// call repeatedly; only the first call does anything.
    pub fn destroy(&self) {
        if !self.context.store.mark_destroyed() {
            return;
        }

        if let Some(reporter) = self.reporter.lock().take() {
            reporter.stop();
        }

        let subscriptions: Vec<Subscription> = std::mem::take(&mut *self.subscriptions.lock());
        let cancelled = subscriptions.len();
        for subscription in subscriptions {
            subscription.cancel();
        }

        info!(session_id = %self.context.session_id, cancelled, "Performance monitor destroyed");
    }
}

impl SuppressionSink for PerformanceMonitor {
    fn record_suppression(&self, kind: SuppressionKind) {
        self.context.store.record_suppression(kind);
    }

    fn record_overhead(&self, kind: TimingKind, elapsed: std::time::Duration) {
        self.context.store.record_overhead(kind, elapsed);
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn attach_unload_reports(
    host: &dyn PerformanceHost,
    context: &Arc<ReportContext>,
    subscriptions: &mut Vec<Subscription>,
) {
    for event in [PageEvent::BeforeUnload, PageEvent::PageHide] {
        let weak = Arc::downgrade(context);
        let listener = host.on_page_event(
            event,
            Box::new(move || {
                if let Some(context) = weak.upgrade() {
                    context.generate_and_store();
                }
            }),
        );

        match listener {
            Ok(subscription) => subscriptions.push(subscription),
            Err(e) => debug!(event = ?event, error = %e, "unload listener not attached"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::report::MAX_IMPACT_SCORE;
    use crate::storage::{tests::BrokenStorage, MemoryStorage};
    use crate::suppression::ConsoleLevel;
    use crate::types::{EntryType, MemoryUsage, NavigationTiming, PerformanceEntry};
    use pretty_assertions::assert_eq;

    fn start(host: &Arc<FakeHost>) -> PerformanceMonitor {
        PerformanceMonitor::start(MonitorConfig::default(), host.clone(), Arc::new(MemoryStorage::new())).unwrap()
    }

    fn navigation() -> NavigationTiming {
        NavigationTiming {
            navigation_start: 0.0,
            request_start: 5.0,
            response_start: 45.0,
            dom_content_loaded_event_end: 300.0,
            load_event_end: 650.0,
        }
    }

    #[test]
    fn test_start_wires_collectors() {
        let memory = MemoryUsage { used: 20, total: 40, limit: 100 };
        let host = Arc::new(FakeHost::new().loaded(navigation()).with_memory(memory));
        let monitor = start(&host);

        assert_eq!(monitor.state(), LifecycleState::Running);
        for entry_type in [
            EntryType::Paint,
            EntryType::LargestContentfulPaint,
            EntryType::FirstInput,
            EntryType::LayoutShift,
            EntryType::LongTask,
        ] {
            assert_eq!(host.observer_count(entry_type), 1);
        }
        assert_eq!(host.frame_callback_count(), 1);
        assert_eq!(host.page_listener_count(), 2);

        let metrics = monitor.metrics();
        assert_eq!(metrics.memory_usage, Some(memory));
        assert_eq!(metrics.ttfb, Some(40.0));
    }

    #[test]
    fn test_empty_report() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);

        let report = monitor.generate_report();
        assert_eq!(report.impact_score, 0);
        assert_eq!(
            report.recommendations,
            vec!["Error suppression performing optimally with minimal impact.".to_string()]
        );
        assert_eq!(report.session_id, monitor.session_id());
        assert_eq!(report.user_agent, "FakeHost/1.0");
        assert!(!report.suppression_active);
    }

    #[test]
    fn test_report_from_host_activity() {
        let host = Arc::new(FakeHost::new().with_suppression_active());
        let monitor = start(&host);

        host.set_memory(MemoryUsage { used: 90, total: 95, limit: 100 });
        host.emit(EntryType::LongTask, &vec![PerformanceEntry::long_task(0.0, 60.0); 15]);
        for i in 1..=150 {
            host.frame(f64::from(i) * 40.0);
        }

        let report = monitor.generate_report();
        assert_eq!(report.metrics.frame_drops, Some(150));
        assert_eq!(report.metrics.long_tasks, Some(15));
        assert_eq!(report.impact_score, 65);
        assert!(report.suppression_active);
        assert!(report.impact_score <= MAX_IMPACT_SCORE);
        // The report samples memory fresh
        assert_eq!(monitor.metrics().memory_usage.unwrap().used, 90);
    }

    #[test]
    fn test_suppression_through_layer() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);
        let layer = monitor.suppression_layer();

        for _ in 0..1001 {
            layer.console(ConsoleLevel::Warn, "Wallet extension not found");
        }
        monitor.record_suppression(SuppressionKind::Request);
        SuppressionSink::record_suppression(&monitor, SuppressionKind::Script);

        let stats = monitor.suppression_stats();
        assert_eq!(stats.warnings, 1001);
        assert_eq!(stats.blocked_requests, 1);
        assert_eq!(stats.removed_scripts, 1);

        let report = monitor.generate_report();
        assert!(report
            .recommendations
            .contains(&"High volume of suppressed messages. Consider more targeted filtering.".to_string()));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);

        monitor.destroy();
        let after_first = monitor.metrics();
        monitor.destroy();

        assert!(monitor.is_destroyed());
        assert_eq!(monitor.metrics(), after_first);
        assert_eq!(host.observer_count(EntryType::LongTask), 0);
        assert_eq!(host.frame_callback_count(), 0);
        assert_eq!(host.page_listener_count(), 0);
    }

    #[test]
    fn test_late_callbacks_after_destroy_are_ignored() {
        let host = Arc::new(FakeHost::new().ignoring_cancel());
        let monitor = start(&host);
        host.emit(EntryType::LongTask, &[PerformanceEntry::long_task(0.0, 70.0)]);

        monitor.destroy();
        // The host kept delivering despite the disconnect
        assert_eq!(host.observer_count(EntryType::LongTask), 1);
        host.emit(EntryType::LongTask, &[PerformanceEntry::long_task(0.0, 70.0)]);
        host.emit(EntryType::Paint, &[PerformanceEntry::paint("first-contentful-paint", 10.0)]);
        host.frame(500.0);
        host.fire(PageEvent::PageHide);
        monitor.record_suppression(SuppressionKind::Error);

        let metrics = monitor.metrics();
        assert_eq!(metrics.long_tasks, Some(1));
        assert_eq!(metrics.fcp, None);
        assert_eq!(metrics.frame_drops, None);
        assert_eq!(metrics.suppressed_errors, 0);
        assert!(monitor.stored_reports().is_empty());
    }

    #[test]
    fn test_unload_events_store_once_each() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);

        host.fire(PageEvent::PageHide);
        assert_eq!(monitor.stored_reports().len(), 1);
        host.fire(PageEvent::BeforeUnload);
        host.fire(PageEvent::BeforeUnload);
        host.fire(PageEvent::PageHide);

        let stored = monitor.stored_reports();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|r| r.session_id == monitor.session_id()));
    }

    #[test]
    fn test_broken_storage_does_not_affect_reports() {
        let host = Arc::new(FakeHost::new());
        let monitor =
            PerformanceMonitor::start(MonitorConfig::default(), host.clone(), Arc::new(BrokenStorage)).unwrap();

        host.fire(PageEvent::PageHide);
        let report = monitor.generate_report();
        assert!(!report.recommendations.is_empty());
        assert!(monitor.stored_reports().is_empty());
    }

    #[test]
    fn test_drop_tears_down() {
        let host = Arc::new(FakeHost::new());
        {
            let _monitor = start(&host);
            assert_eq!(host.frame_callback_count(), 1);
        }
        assert_eq!(host.frame_callback_count(), 0);
        assert_eq!(host.observer_count(EntryType::Paint), 0);
    }

    #[test]
    fn test_frames_can_be_disabled() {
        let host = Arc::new(FakeHost::new().loaded(navigation()));
        let mut config = MonitorConfig::default();
        config.sampling.track_frames = false;
        config.reporting.report_on_unload = false;

        let _monitor = PerformanceMonitor::start(config, host.clone(), Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(host.frame_callback_count(), 0);
        assert_eq!(host.page_listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_reports() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);

        time::sleep(Duration::from_secs(59)).await;
        assert!(monitor.stored_reports().is_empty());

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(monitor.stored_reports().len(), 1);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(monitor.stored_reports().len(), 2);

        monitor.destroy();
        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(monitor.stored_reports().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persisted_log_is_capped() {
        let host = Arc::new(FakeHost::new());
        let monitor = start(&host);

        // Tick k fires at 60k s, halfway between two suppressions, so the
        // report it stores carries exactly k suppressed errors
        time::sleep(Duration::from_secs(30)).await;
        for _ in 0..15 {
            monitor.record_suppression(SuppressionKind::Error);
            time::sleep(Duration::from_secs(60)).await;
        }

        let counts: Vec<u64> = monitor
            .stored_reports()
            .iter()
            .map(|r| r.metrics.suppressed_errors)
            .collect();
        assert_eq!(counts, (6..=15).collect::<Vec<_>>());
    }
}
