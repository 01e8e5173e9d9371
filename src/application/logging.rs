//! # Logging
//!
//! Console plus a per-session log file. The file is cleared on every start.
//! `RUST_LOG` overrides the configured filter.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

/// Builds the filter, preferring `RUST_LOG` over the configured directive.
pub fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Creates the log directory and removes the previous session's log.
pub fn prepare_log_file(config: &LoggingConfig) -> Result<()> {
    let dir = Path::new(&config.dir);
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", config.dir))?;
    }

    let log_path = dir.join(&config.file);
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }
    Ok(())
}

/// Installs the global subscriber. Keep the returned guard alive until exit,
/// dropping it flushes the file writer.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    prepare_log_file(config)?;

    let file_appender = tracing_appender::rolling::never(&config.dir, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(filter(config))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_clears_previous_log() {
        let tmp = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            dir: tmp.path().join("logs").to_string_lossy().into_owned(),
            file: "session.log".into(),
            filter: "info".into(),
        };

        prepare_log_file(&config).unwrap();
        let log = Path::new(&config.dir).join("session.log");
        fs::write(&log, "old session").unwrap();

        prepare_log_file(&config).unwrap();
        assert!(Path::new(&config.dir).is_dir());
        assert!(!log.exists());
    }
}
