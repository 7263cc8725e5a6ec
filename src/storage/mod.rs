//! Durable key-value storage and the rolling report log kept in it

mod file;
mod memory;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::{error::Result, report::PerformanceReport};

/// Local key-value storage, the way a page's `localStorage` behaves
pub trait KeyValueStore: Send + Sync {
    /// Value under `key`, `None` if nothing was ever written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Bounded, oldest-first log of reports stored as one JSON array under a
/// single key. Every operation is best-effort.
///
/// Appends are read-modify-write on the whole array, so they are serialized
/// through a lock shared by every clone of the log.
#[derive(Clone)]
pub struct ReportLog {
    store: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    write_lock: Arc<Mutex<()>>,
}

impl ReportLog {
    /// A log under `key` keeping at most `capacity` reports (at least one)
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            store,
            key: key.into(),
            capacity: capacity.max(1),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storage key the log lives under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Maximum number of reports kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored reports, oldest first. Empty when absent, corrupt or
    /// unreadable.
    pub fn load(&self) -> Vec<PerformanceReport> {
        self.try_load().unwrap_or_else(|e| {
            debug!(key = %self.key, error = %e, "report log unreadable, treating as empty");
            Vec::new()
        })
    }

    /// Append a report, evicting the oldest entries beyond capacity.
    /// Failures are logged and dropped.
    pub fn append(&self, report: &PerformanceReport) {
        if let Err(e) = self.try_append(report) {
            debug!(key = %self.key, error = %e, "report not persisted");
        }
    }

    fn try_load(&self) -> Result<Vec<PerformanceReport>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_append(&self, report: &PerformanceReport) -> Result<()> {
        let _guard = self.write_lock.lock();

        let mut reports = self.load();
        reports.push(report.clone());
        if reports.len() > self.capacity {
            let excess = reports.len() - self.capacity;
            reports.drain(..excess);
        }

        let raw = serde_json::to_string(&reports)?;
        self.store.set(&self.key, &raw)
    }
}
