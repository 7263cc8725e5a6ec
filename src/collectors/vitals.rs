use std::sync::{Arc, Weak};

use tracing::debug;

use super::{attach, live};
use crate::{
    host::{PerformanceHost, Subscription},
    metrics::MetricStore,
    types::{EntryType, PageEvent, PerformanceEntry},
};

const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// Start time of the first-contentful-paint entry in a paint batch
pub(crate) fn first_contentful_paint(entries: &[PerformanceEntry]) -> Option<f64> {
    entries
        .iter()
        .find(|e| e.name == FIRST_CONTENTFUL_PAINT)
        .map(|e| e.start_time)
}

/// The platform revises LCP by emitting newer entries; the last one wins
pub(crate) fn largest_contentful_paint(entries: &[PerformanceEntry]) -> Option<f64> {
    entries.last().map(|e| e.start_time)
}

/// Input delay of the last qualifying first-input entry in the batch.
/// Entries with a zero start or processing time do not qualify.
pub(crate) fn first_input_delay(entries: &[PerformanceEntry]) -> Option<f64> {
    entries
        .iter()
        .filter_map(|e| match e.processing_start {
            Some(processing_start) if processing_start != 0.0 && e.start_time != 0.0 => {
                Some(processing_start - e.start_time)
            }
            _ => None,
        })
        .last()
}

/// Layout shift contributed by a batch, ignoring shifts caused by recent input
pub(crate) fn layout_shift(entries: &[PerformanceEntry]) -> f64 {
    entries
        .iter()
        .filter(|e| !e.had_recent_input)
        .filter_map(|e| e.value)
        .sum()
}

/// Subscribe to paint, LCP, first-input and layout-shift, and arrange for
/// navigation timing to be captured once.
pub(crate) fn attach_web_vitals(
    host: &Arc<dyn PerformanceHost>,
    store: &Arc<MetricStore>,
    subscriptions: &mut Vec<Subscription>,
) {
    let weak = Arc::downgrade(store);
    attach(host.as_ref(), EntryType::Paint, subscriptions, move |entries| {
        if let (Some(store), Some(fcp)) = (live(&weak), first_contentful_paint(entries)) {
            store.set_fcp(fcp);
        }
    });

    let weak = Arc::downgrade(store);
    attach(host.as_ref(), EntryType::LargestContentfulPaint, subscriptions, move |entries| {
        if let (Some(store), Some(lcp)) = (live(&weak), largest_contentful_paint(entries)) {
            store.set_lcp(lcp);
        }
    });

    let weak = Arc::downgrade(store);
    attach(host.as_ref(), EntryType::FirstInput, subscriptions, move |entries| {
        if let (Some(store), Some(fid)) = (live(&weak), first_input_delay(entries)) {
            store.set_fid(fid);
        }
    });

    let weak = Arc::downgrade(store);
    attach(host.as_ref(), EntryType::LayoutShift, subscriptions, move |entries| {
        if let Some(store) = live(&weak) {
            store.add_layout_shift(layout_shift(entries));
        }
    });

    attach_navigation_timing(host, store, subscriptions);
}

fn attach_navigation_timing(
    host: &Arc<dyn PerformanceHost>,
    store: &Arc<MetricStore>,
    subscriptions: &mut Vec<Subscription>,
) {
    if host.is_loaded() {
        capture_navigation_timing(host.as_ref(), store);
        return;
    }

    let weak_host: Weak<dyn PerformanceHost> = Arc::downgrade(host);
    let weak_store = Arc::downgrade(store);
    let listener = host.on_page_event(
        PageEvent::Load,
        Box::new(move || {
            if let (Some(host), Some(store)) = (weak_host.upgrade(), live(&weak_store)) {
                capture_navigation_timing(host.as_ref(), &store);
            }
        }),
    );

    match listener {
        Ok(subscription) => subscriptions.push(subscription),
        Err(e) => debug!(error = %e, "navigation timing listener not attached"),
    }
}

fn capture_navigation_timing(host: &dyn PerformanceHost, store: &MetricStore) {
    if store.is_destroyed() {
        return;
    }
    match host.navigation_timing() {
        Some(timing) => store.set_navigation(&timing),
        None => debug!("host has no navigation timing entry"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;
    use crate::types::NavigationTiming;

    fn setup(host: FakeHost) -> (Arc<FakeHost>, Arc<MetricStore>, Vec<Subscription>) {
        let host = Arc::new(host);
        let dyn_host: Arc<dyn PerformanceHost> = host.clone();
        let store = Arc::new(MetricStore::new());
        let mut subscriptions = Vec::new();
        attach_web_vitals(&dyn_host, &store, &mut subscriptions);
        (host, store, subscriptions)
    }

    fn navigation() -> NavigationTiming {
        NavigationTiming {
            navigation_start: 0.0,
            request_start: 10.0,
            response_start: 60.0,
            dom_content_loaded_event_end: 350.0,
            load_event_end: 700.0,
        }
    }

    #[test]
    fn test_first_contentful_paint_picks_named_entry() {
        let entries = vec![
            PerformanceEntry::paint("first-paint", 80.0),
            PerformanceEntry::paint("first-contentful-paint", 95.0),
        ];
        assert_eq!(first_contentful_paint(&entries), Some(95.0));
        assert_eq!(first_contentful_paint(&entries[..1]), None);
    }

    #[test]
    fn test_first_input_delay_requires_both_timestamps() {
        let entries = vec![
            PerformanceEntry::first_input(0.0, 12.0),
            PerformanceEntry::first_input(400.0, 412.5),
        ];
        assert_eq!(first_input_delay(&entries), Some(12.5));
        assert_eq!(first_input_delay(&entries[..1]), None);
    }

    #[test]
    fn test_layout_shift_skips_recent_input() {
        let entries = vec![
            PerformanceEntry::layout_shift(0.1, false),
            PerformanceEntry::layout_shift(0.5, true),
            PerformanceEntry::layout_shift(0.02, false),
        ];
        assert!((layout_shift(&entries) - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_streams_feed_store() {
        let (host, store, subscriptions) = setup(FakeHost::new().loaded(navigation()));
        assert_eq!(subscriptions.len(), 4);

        host.emit(EntryType::Paint, &[PerformanceEntry::paint("first-contentful-paint", 110.0)]);
        host.emit(EntryType::LargestContentfulPaint, &[PerformanceEntry::largest_contentful_paint(900.0)]);
        // A later, smaller revision still replaces the value
        host.emit(EntryType::LargestContentfulPaint, &[PerformanceEntry::largest_contentful_paint(850.0)]);
        host.emit(EntryType::FirstInput, &[PerformanceEntry::first_input(1000.0, 1008.0)]);
        host.emit(EntryType::LayoutShift, &[PerformanceEntry::layout_shift(0.05, false)]);
        host.emit(EntryType::LayoutShift, &[PerformanceEntry::layout_shift(0.05, false)]);

        let snapshot = store.get();
        assert_eq!(snapshot.fcp, Some(110.0));
        assert_eq!(snapshot.lcp, Some(850.0));
        assert_eq!(snapshot.fid, Some(8.0));
        assert!((snapshot.cls.unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(snapshot.ttfb, Some(50.0));
        assert_eq!(snapshot.window_load, Some(700.0));
    }

    #[test]
    fn test_unsupported_stream_leaves_others_running() {
        let (host, store, subscriptions) = setup(FakeHost::new().without(EntryType::LayoutShift));
        assert_eq!(subscriptions.len(), 4); // three observers and the load listener

        host.emit(EntryType::Paint, &[PerformanceEntry::paint("first-contentful-paint", 70.0)]);
        let snapshot = store.get();
        assert_eq!(snapshot.fcp, Some(70.0));
        assert_eq!(snapshot.cls, None);
    }

    #[test]
    fn test_navigation_deferred_until_load() {
        let (host, store, _subscriptions) = setup(FakeHost::new());
        assert_eq!(store.get().ttfb, None);
        assert_eq!(host.page_listener_count(), 1);

        host.set_navigation(navigation());
        host.fire(PageEvent::Load);
        assert_eq!(store.get().dom_content_loaded, Some(350.0));

        // The listener was consumed, a second load does nothing
        host.set_navigation(NavigationTiming { load_event_end: 5000.0, ..navigation() });
        host.fire(PageEvent::Load);
        assert_eq!(store.get().window_load, Some(700.0));
    }
}
