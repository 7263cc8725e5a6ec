//! Monitor configuration and its defaults

use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::error::{MonitorError, Result};

/// Local-storage key the rolling report log lives under
pub const DEFAULT_STORAGE_KEY: &str = "fightconnect_perf_reports";

/// Extension and wallet keywords whose messages get swallowed
pub const DEFAULT_SUPPRESS_KEYWORDS: &[&str] = &[
    "metamask", "chrometransport", "extension not found", "connectchrome",
    "wallet", "web3", "ethereum", "injected provider", "browser extension",
    "chrome extension", "firefox extension", "extension error", "wallet_",
    "coinbase wallet", "trust wallet", "phantom", "solflare", "keplr",
    "leap wallet", "station wallet", "terra station", "binance wallet",
    "okx wallet", "rabby", "frame", "talisman", "subwallet", "polkadot",
    "kusama", "avalanche wallet", "core wallet", "xdefi", "leap cosmos",
    "cosmostation", "keplr extension", "metamask extension", "wallet extension",
    "crypto wallet", "defi wallet", "nft wallet", "blockchain wallet",
];

/// Top-level monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Report cadence and persistence
    pub reporting: ReportingConfig,
    /// Frame sampling
    pub sampling: SamplingConfig,
    /// Extension-noise filter
    pub suppression: SuppressionConfig,
}

/// When reports are produced and where they are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Period of the background report task
    pub interval: Duration,

    /// Key of the persisted report log
    pub storage_key: String,

    /// Capacity of the persisted report log
    pub max_stored_reports: usize,

    /// Whether page-hide / before-unload produce a final report
    pub report_on_unload: bool,

    /// Prefix of generated session identifiers
    pub session_prefix: String,
}

/// Frame-drop detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Frame intervals longer than this count as a drop (two 60fps frames)
    pub frame_drop_threshold_ms: f64,

    /// Whether the per-frame callback is registered at all
    pub track_frames: bool,
}

/// Keyword filter settings for the interception layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Whether the keyword filter swallows anything
    pub enabled: bool,

    /// Case-insensitive substrings that mark a message as extension noise
    pub keywords: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            reporting: ReportingConfig {
                interval: Duration::from_secs(60),
                storage_key: DEFAULT_STORAGE_KEY.to_string(),
                max_stored_reports: 10,
                report_on_unload: true,
                session_prefix: "perf".to_string(),
            },
            sampling: SamplingConfig {
                frame_drop_threshold_ms: 33.34,
                track_frames: true,
            },
            suppression: SuppressionConfig::default(),
        }
    }
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keywords: DEFAULT_SUPPRESS_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl MonitorConfig {
    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.reporting.interval.is_zero() {
            return Err(MonitorError::Configuration {
                message: "Report interval must be greater than zero".to_string(),
                parameter: "interval".to_string(),
            });
        }

        if self.reporting.max_stored_reports == 0 {
            return Err(MonitorError::Configuration {
                message: "Report log needs room for at least one report".to_string(),
                parameter: "max_stored_reports".to_string(),
            });
        }

        if self.reporting.storage_key.trim().is_empty() {
            return Err(MonitorError::Configuration {
                message: "Storage key cannot be empty".to_string(),
                parameter: "storage_key".to_string(),
            });
        }

        let threshold = self.sampling.frame_drop_threshold_ms;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(MonitorError::Configuration {
                message: "Frame drop threshold must be a positive number of milliseconds".to_string(),
                parameter: "frame_drop_threshold_ms".to_string(),
            });
        }

        Ok(())
    }
}
