//! Logging configuration
//!
//! Console logs go to stderr so they never mix with command output on
//! stdout. An optional log directory receives JSON lines, rotated daily.

use anyhow::Result;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Level for a given `-v` count
    pub fn level_for_verbosity(verbose: u8) -> &'static str {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber. `RUST_LOG` overrides `level`.
    ///
    /// The returned guard flushes the file writer and must be held until exit.
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.level));

        let (json_console, plain_console) = if self.json_format {
            (Some(fmt::layer().json().with_writer(io::stderr)), None)
        } else {
            (
                None,
                Some(fmt::layer().with_target(true).with_writer(io::stderr)),
            )
        };

        let (file_layer, guard) = match &self.log_dir {
            Some(dir) => {
                let (writer, guard) = non_blocking(rolling::daily(dir, "reconciler.log"));
                let layer = fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_console)
            .with(plain_console)
            .with(file_layer)
            .try_init()?;

        tracing::debug!(level = %self.level, "logging initialized");

        Ok(guard)
    }
}
