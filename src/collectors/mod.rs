//! Collectors that translate host observation streams into metric store
//! writes.
//!
//! Every callback holds only a `Weak` reference to the store and checks the
//! destroyed flag first, because a host may still deliver notifications that
//! were queued before the subscription was cancelled.

mod resources;
mod vitals;

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

pub(crate) use resources::{attach_frame_monitor, attach_long_tasks, sample_memory};
pub(crate) use vitals::attach_web_vitals;

use crate::{
    host::{PerformanceHost, Subscription},
    metrics::MetricStore,
    types::{EntryType, PerformanceEntry},
};

/// Upgrade a store reference, unless the monitor is gone or torn down
pub(crate) fn live(store: &Weak<MetricStore>) -> Option<Arc<MetricStore>> {
    store.upgrade().filter(|s| !s.is_destroyed())
}

/// Subscribe to one observation stream. Unsupported streams are skipped.
fn attach(
    host: &dyn PerformanceHost,
    entry_type: EntryType,
    subscriptions: &mut Vec<Subscription>,
    callback: impl Fn(&[PerformanceEntry]) + Send + Sync + 'static,
) {
    match host.observe(entry_type, Box::new(callback)) {
        Ok(subscription) => subscriptions.push(subscription),
        Err(e) if e.is_capability_gap() => {
            debug!(entry_type = entry_type.as_str(), error = %e, "observer not attached")
        }
        Err(e) => warn!(entry_type = entry_type.as_str(), error = %e, "observer registration failed"),
    }
}
