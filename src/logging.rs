//! Tracing setup.
//!
//! The TUI owns the terminal, so it writes to `{state}/logs/anamnese-{ts}.log`.
//! Subcommands write to stderr so stdout stays clean for piping.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the non-blocking writer alive; drop it last to flush buffered lines.
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    pub log_file_path: Option<PathBuf>,
}

/// Where log lines go for a given run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn select(config: &Config, is_tui_mode: bool, now: DateTime<Utc>) -> Self {
        if is_tui_mode && config.logging.to_file {
            LogTarget::File(config.logs_path().join(log_file_name(now)))
        } else {
            LogTarget::Stderr
        }
    }
}

pub fn log_file_name(now: DateTime<Utc>) -> String {
    format!("anamnese-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// `--debug` wins over the configured level; `RUST_LOG` wins over both.
fn filter_directive(config: &Config, debug_override: bool) -> String {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        return directive;
    }
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = EnvFilter::new(filter_directive(config, debug_override));

    match LogTarget::select(config, is_tui_mode, Utc::now()) {
        LogTarget::File(path) => {
            let logs_dir = config.logs_path();
            std::fs::create_dir_all(&logs_dir).with_context(|| {
                format!("Failed to create logs directory {}", logs_dir.display())
            })?;

            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .context("Log path has no file name")?;
            let appender = tracing_appender::rolling::never(&logs_dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();

            Ok(LoggingHandle {
                _guard: Some(guard),
                log_file_path: Some(path),
            })
        }
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();

            Ok(LoggingHandle {
                _guard: None,
                log_file_path: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_log_file_name_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(log_file_name(now), "anamnese-20260304T050607Z.log");
    }

    #[test]
    fn test_tui_mode_logs_under_state_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        match LogTarget::select(&config, true, Utc::now()) {
            LogTarget::File(path) => {
                assert!(path.starts_with(temp_dir.path().join("logs")));
                assert!(path.to_string_lossy().ends_with(".log"));
            }
            LogTarget::Stderr => panic!("expected file target in TUI mode"),
        }
    }

    #[test]
    fn test_cli_mode_logs_to_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        assert_eq!(
            LogTarget::select(&config, false, Utc::now()),
            LogTarget::Stderr
        );
    }

    #[test]
    fn test_tui_mode_with_file_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.logging.to_file = false;
        assert_eq!(
            LogTarget::select(&config, true, Utc::now()),
            LogTarget::Stderr
        );
    }
}
