//! Structured logging setup using the `tracing` ecosystem.
//!
//! Configures a `tracing-subscriber` with either JSON output (for
//! production) or pretty-printed output (for TTY / local dev). Format
//! is auto-detected from the terminal but can be forced via `--json`
//! or `--pretty`. With `--log-file`, plain timestamped lines (or JSON
//! with `--json`) are appended to that file instead. File writes happen on
//! a `tracing-appender` worker thread, so request handling never blocks on
//! disk; the returned [`WorkerGuard`] flushes that worker when dropped.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;
use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool, to_file: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || to_file || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process when logging to a file.
pub fn init(
    level: &LogLevel,
    format: LogFormat,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>, RelayError> {
    let tracing_level = level.to_tracing_level();
    let filter = tracing_subscriber::filter::Targets::new().with_default(tracing_level);

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RelayError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        let (writer, guard) = tracing_appender::non_blocking(file);

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_target(false).with_writer(writer))
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(
                        fmt::layer()
                            .with_ansi(false)
                            .with_target(false)
                            .with_writer(writer),
                    )
                    .init();
            }
        }
        return Ok(Some(guard));
    }

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(None)
}
