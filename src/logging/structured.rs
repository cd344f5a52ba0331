//! tracing-subscriber setup
//!
//! Console output is always on. With `logging.local_enabled` set, JSON lines
//! also go to a rolling file through a non-blocking writer, so a scheduled run
//! leaves one machine-readable record per report and per run.

use crate::config::LoggingConfig;
use crate::domain::{Result, SyncError};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Prefix of the rolling log files, suffixed with the rotation period
const LOG_FILE_PREFIX: &str = "cleos-sync.log";

/// HTTP stack crates kept at warn unless `RUST_LOG` says otherwise
const QUIET_DEPENDENCIES: &[&str] = &["reqwest", "hyper", "rustls"];

/// Keeps the file writer alive; dropping it flushes buffered lines
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```no_run
/// use cleos_sync::logging::init_logging;
/// use cleos_sync::config::LoggingConfig;
///
/// let _guard = init_logging("info", &LoggingConfig::console_only())
///     .expect("Failed to initialize logging");
/// ```
///
/// # Errors
///
/// Fails on an unknown level, an uncreatable log directory or when a
/// subscriber is already installed.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
    };

    let mut layers = vec![tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter())
        .boxed()];

    let file_guard = if config.local_enabled {
        let appender = rolling_appender(config)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_writer(writer)
            .with_filter(filter())
            .boxed();
        layers.push(layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| SyncError::Configuration(format!("Failed to install subscriber: {e}")))?;

    tracing::debug!(
        level = %level,
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn rolling_appender(config: &LoggingConfig) -> Result<RollingFileAppender> {
    let directory = Path::new(&config.local_path);
    std::fs::create_dir_all(directory).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            directory.display()
        ))
    })?;
    Ok(RollingFileAppender::new(
        parse_rotation(&config.local_rotation),
        directory,
        LOG_FILE_PREFIX,
    ))
}

/// Filter directives used when `RUST_LOG` is unset
fn default_directives(level: Level) -> String {
    let mut directives = format!("cleos_sync={level}");
    for krate in QUIET_DEPENDENCIES {
        directives.push_str(&format!(",{krate}=warn"));
    }
    directives
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SyncError::Configuration(format!(
            "Invalid log level: {level}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("trace", Level::TRACE)]
    #[test_case("Debug", Level::DEBUG)]
    #[test_case("INFO", Level::INFO)]
    #[test_case("warn", Level::WARN)]
    #[test_case("error", Level::ERROR)]
    fn test_parse_log_level(input: &str, expected: Level) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_default_directives_quiet_http_stack() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("cleos_sync=DEBUG"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.contains("hyper=warn"));
    }

    #[test]
    fn test_rolling_appender_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("logs").display().to_string(),
            local_rotation: "never".to_string(),
        };
        assert!(rolling_appender(&config).is_ok());
        assert!(dir.path().join("logs").is_dir());
    }
}
