//! Error type shared by the host seam, storage and scoring

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Failures inside the monitor. None of these reach the public read/update
/// operations; they are logged and absorbed at the call site.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The host lacks an observation stream or other capability
    #[error("{capability} is not supported by the host")]
    Unsupported {
        /// What was missing
        capability: String,
    },

    /// Reading or writing durable storage failed
    #[error("storage error for key '{key}': {message}")]
    Storage {
        /// Storage key involved
        key: String,
        /// Backend message
        message: String,
    },

    /// The persisted log could not be encoded or decoded
    #[error("report log serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Configuration error for {parameter}: {message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// Offending setting
        parameter: String,
    },

    /// A metric needed for scoring was NaN or infinite
    #[error("metric '{metric}' is not a finite number")]
    Computation {
        /// Wire name of the metric
        metric: &'static str,
    },
}

impl MonitorError {
/// Shorthand for [`MonitorError::Unsupported`], for host implementations
    pub fn unsupported(capability: impl Into<String>) -> Self {
        MonitorError::Unsupported {
            capability: capability.into(),
        }
    }

    /// Missing host capabilities are the expected terminal state for a
    /// metric, not a fault.
    pub fn is_capability_gap(&self) -> bool {
        matches!(self, MonitorError::Unsupported { .. })
    }
}
