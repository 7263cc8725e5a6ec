use std::sync::Arc;

use tracing::debug;

use super::{attach, live};
use crate::{
    host::{PerformanceHost, Subscription},
    metrics::MetricStore,
    types::EntryType,
};

/// Overwrite the memory sample with the host's current heap usage, if any
pub(crate) fn sample_memory(host: &dyn PerformanceHost, store: &MetricStore) {
    if let Some(memory) = host.memory() {
        store.set_memory(memory);
    }
}

/// Every long-task batch adds its entry count to the counter
pub(crate) fn attach_long_tasks(
    host: &dyn PerformanceHost,
    store: &Arc<MetricStore>,
    subscriptions: &mut Vec<Subscription>,
) {
    let weak = Arc::downgrade(store);
    attach(host, EntryType::LongTask, subscriptions, move |entries| {
        if let Some(store) = live(&weak) {
            store.add_long_tasks(entries.len() as u64);
        }
    });
}

/// Counts frame intervals longer than a threshold
#[derive(Debug, Clone)]
pub(crate) struct FrameDropDetector {
    last_frame: f64,
    threshold_ms: f64,
}

impl FrameDropDetector {
    pub(crate) fn new(start: f64, threshold_ms: f64) -> Self {
        Self {
            last_frame: start,
            threshold_ms,
        }
    }

    /// Feed one frame timestamp; true if the gap since the previous frame
    /// counts as a drop.
    pub(crate) fn on_frame(&mut self, now: f64) -> bool {
        let elapsed = now - self.last_frame;
        self.last_frame = now;
        elapsed > self.threshold_ms
    }
}

pub(crate) fn attach_frame_monitor(
    host: &dyn PerformanceHost,
    store: &Arc<MetricStore>,
    threshold_ms: f64,
    subscriptions: &mut Vec<Subscription>,
) {
    let weak = Arc::downgrade(store);
    let mut detector = FrameDropDetector::new(host.now(), threshold_ms);

    let registration = host.request_frames(Box::new(move |now| {
        if let Some(store) = live(&weak) {
            store.record_frame(detector.on_frame(now));
        }
    }));

    match registration {
        Ok(subscription) => subscriptions.push(subscription),
        Err(e) => debug!(error = %e, "frame monitor not attached"),
    }
}
