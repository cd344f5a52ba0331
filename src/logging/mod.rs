//! Logging and observability
//!
//! Structured logging built on `tracing`:
//! - human readable console output
//! - optional JSON rolling file output
//! - `RUST_LOG` overrides
//!
//! # Example
//!
//! ```no_run
//! use cleos_sync::logging::init_logging;
//! use cleos_sync::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::default())
//!     .expect("Failed to initialize logging");
//!
//! tracing::info!(series = "275_2020-01-01", "Sync started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a report that reached durable storage
///
/// # Example
///
/// ```no_run
/// use cleos_sync::log_report_stored;
/// use std::time::Duration;
///
/// log_report_stored!("275_2020-01-01", "11661", "clearing.csv", 1024, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_report_stored {
    ($series:expr, $report_id:expr, $filename:expr, $bytes:expr, $elapsed:expr) => {
        tracing::info!(
            series = %$series,
            report_id = %$report_id,
            filename = %$filename,
            bytes = $bytes,
            elapsed_ms = $elapsed.as_millis() as u64,
            "Report stored"
        );
    };
}

/// Log a failed run with its classification
///
/// # Example
///
/// ```no_run
/// use cleos_sync::log_run_failure;
/// use cleos_sync::domain::{Failure, FailureKind};
///
/// let failure = Failure::new(FailureKind::Auth, "401 Unauthorized");
/// log_run_failure!("275_2020-01-01", &failure, 0);
/// ```
#[macro_export]
macro_rules! log_run_failure {
    ($series:expr, $failure:expr, $delivered:expr) => {
        tracing::error!(
            series = %$series,
            kind = %$failure.kind,
            duplicate_risk = $failure.kind.duplicate_risk(),
            delivered = $delivered,
            error = %$failure.message,
            "Sync run failed"
        );
    };
}
