use std::sync::Arc;

use crate::{
    config::MonitorConfig,
    error::{MonitorError, Result},
    host::PerformanceHost,
    storage::{KeyValueStore, MemoryStorage},
};

use super::monitor::PerformanceMonitor;

/// Builder for constructing a PerformanceMonitor instance
pub struct MonitorBuilder {
    config: Option<MonitorConfig>,
    host: Option<Arc<dyn PerformanceHost>>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl MonitorBuilder {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            config: None,
            host: None,
            storage: None,
        }
    }

    /// Set the monitor configuration
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the host that delivers performance events
    pub fn with_host(mut self, host: Arc<dyn PerformanceHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the storage backing the report log; defaults to in-memory
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Start the monitor
    pub fn start(self) -> Result<PerformanceMonitor> {
        let host = self.host.ok_or_else(|| MonitorError::Configuration {
            message: "A performance host is required".to_string(),
            parameter: "host".to_string(),
        })?;
        let storage = match self.storage {
            Some(storage) => storage,
            None => Arc::new(MemoryStorage::new()) as Arc<dyn KeyValueStore>,
        };

        PerformanceMonitor::start(self.config.unwrap_or_default(), host, storage)
    }
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
