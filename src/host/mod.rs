//! Seam between the monitor and the environment that produces performance
//! events (a browser binding, a native shell, or a scripted test host).

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;

use crate::{
    error::Result,
    types::{EntryType, MemoryUsage, NavigationTiming, PageEvent, PerformanceEntry},
};

/// Receives each batch of entries delivered by an observation stream
pub type EntryCallback = Box<dyn Fn(&[PerformanceEntry]) + Send + Sync>;

/// Called once per rendered frame with the frame timestamp in ms
pub type FrameCallback = Box<dyn FnMut(f64) + Send>;

/// Page lifecycle listener; a host calls it at most once
pub type EventCallback = Box<dyn FnOnce() + Send>;

/// Capabilities the monitor needs from its host.
///
/// Every registration returns a [`Subscription`]. Registrations that the
/// host cannot honour return [`MonitorError::Unsupported`](crate::MonitorError::Unsupported)
/// and the monitor simply leaves the matching metric empty.
pub trait PerformanceHost: Send + Sync {
    /// Monotonic clock in ms, same origin as entry timestamps
    fn now(&self) -> f64;

    /// Subscribe to an observation stream
    fn observe(&self, entry_type: EntryType, callback: EntryCallback) -> Result<Subscription>;

    /// Current heap usage, if the host exposes one
    fn memory(&self) -> Option<MemoryUsage>;

    /// Navigation timing of the current document, if available yet
    fn navigation_timing(&self) -> Option<NavigationTiming>;

    /// Whether the document has finished loading
    fn is_loaded(&self) -> bool;

    /// Register a one-shot page lifecycle listener
    fn on_page_event(&self, event: PageEvent, callback: EventCallback) -> Result<Subscription>;

    /// Register a per-frame callback that keeps firing until cancelled
    fn request_frames(&self, callback: FrameCallback) -> Result<Subscription>;

    /// Identifies the client in reports
    fn user_agent(&self) -> String;

    /// Whether the extension suppression layer is installed on this page
    fn suppression_active(&self) -> bool {
        false
    }
}

/// Handle to a registration with the host. Cancelling (or dropping) it
/// detaches the callback.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Run `cancel` when the handle is cancelled or dropped
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A registration with nothing to undo
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Detach now
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
