use std::path::PathBuf;
use std::sync::{Mutex, Once};

use anyhow::{anyhow, Context};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

static INIT: Once = Once::new();

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include source code locations
    pub source_location: bool,
    /// Output file path (None for stdout)
    pub file_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            timestamps: true,
            source_location: false,
            file_path: None,
        }
    }
}

/// Install the global tracing subscriber. Only the first call in a process
/// has any effect.
pub fn setup_logging(config: LogConfig) -> anyhow::Result<()> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = setup_logging_internal(config);
    });

    result
}

fn setup_logging_internal(config: LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::from_level(config.level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match (config.file_path, config.timestamps) {
        (Some(path), timestamps) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            if timestamps {
                builder.try_init()
            } else {
                builder.without_time().try_init()
            }
        }
        (None, true) => builder.try_init(),
        (None, false) => builder.without_time().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to set global subscriber: {}", e))
}
