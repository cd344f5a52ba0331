//! Domain error types
//!
//! This module defines the error hierarchy for cleos-sync. Library code returns
//! [`SyncError`]; the CLI wraps it in `anyhow` at the edge. Third-party error
//! types are converted to strings so they never leak through the public API.

use std::fmt;
use thiserror::Error;

/// Main cleos-sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client construction or request building errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Report sink errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Checkpoint store errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// A sync run reached the failed terminal state
    #[error("Sync run failed ({kind}) after {delivered} report(s): {message}")]
    RunFailed {
        /// Failure classification
        kind: FailureKind,
        /// Human readable detail
        message: String,
        /// Reports handed to the sink before the failure
        delivered: usize,
    },
}

impl SyncError {
    /// Failure classification when this error is a failed sync run
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            SyncError::RunFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Classification of a failed fetch or a failed run
///
/// Every kind is fatal for the current run. None of them is retried inside
/// the run; operators re-trigger the whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Credentials rejected (401) or access forbidden (403)
    Auth,
    /// Report generation failed remotely (409)
    RemoteExecution,
    /// No further reports will ever be generated for this template (410)
    SeriesClosed,
    /// The query parameters were rejected (400)
    InvalidArgument,
    /// No report exists for the template (404)
    NotFound,
    /// Any other non-success status
    Unknown,
    /// The request never produced a response
    Transport,
    /// A success response was missing required metadata
    InvalidResponse,
    /// The sink failed to persist a report
    Sink,
    /// The checkpoint could not be committed after delivery
    Persistence,
    /// The run deadline expired or shutdown was requested
    Cancelled,
}

impl FailureKind {
    /// Returns true if future runs for this series are pointless until reconfigured
    pub fn is_series_closed(&self) -> bool {
        matches!(self, FailureKind::SeriesClosed)
    }

    /// Returns true if reports may have been stored without a committed checkpoint,
    /// so the next run can re-deliver them
    pub fn duplicate_risk(&self) -> bool {
        matches!(
            self,
            FailureKind::Sink | FailureKind::Persistence | FailureKind::Cancelled
        )
    }

    /// Stable lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Auth => "auth",
            FailureKind::RemoteExecution => "remote_execution",
            FailureKind::SeriesClosed => "series_closed",
            FailureKind::InvalidArgument => "invalid_argument",
            FailureKind::NotFound => "not_found",
            FailureKind::Unknown => "unknown",
            FailureKind::Transport => "transport",
            FailureKind::InvalidResponse => "invalid_response",
            FailureKind::Sink => "sink",
            FailureKind::Persistence => "persistence",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure with its detail message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Failure classification
    pub kind: FailureKind,

    /// Detail message
    pub message: String,
}

impl Failure {
    /// Creates a new failure
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Converts the failure into a run error
    pub fn into_error(self, delivered: usize) -> SyncError {
        SyncError::RunFailed {
            kind: self.kind,
            message: self.message,
            delivered,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<base64::DecodeError> for SyncError {
    fn from(err: base64::DecodeError) -> Self {
        SyncError::Serialization(format!("base64 decode error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let err = SyncError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_run_failed_display_and_kind() {
        let err = Failure::new(FailureKind::Auth, "401 Unauthorized").into_error(1);
        assert_eq!(
            err.to_string(),
            "Sync run failed (auth) after 1 report(s): 401 Unauthorized"
        );
        assert_eq!(err.kind(), Some(FailureKind::Auth));
    }

    #[test]
    fn test_kind_is_none_for_plain_errors() {
        let err = SyncError::Io("disk full".to_string());
        assert!(err.kind().is_none());
    }

    #[test]
    fn test_duplicate_risk_kinds() {
        assert!(FailureKind::Persistence.duplicate_risk());
        assert!(FailureKind::Cancelled.duplicate_risk());
        assert!(FailureKind::Sink.duplicate_risk());
        assert!(!FailureKind::Auth.duplicate_risk());
        assert!(!FailureKind::SeriesClosed.duplicate_risk());
    }

    #[test]
    fn test_series_closed() {
        assert!(FailureKind::SeriesClosed.is_series_closed());
        assert!(!FailureKind::Unknown.is_series_closed());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: SyncError = io_err.into();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: SyncError = json_err.into();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: SyncError = toml_err.into();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_sync_error_implements_std_error() {
        let err = SyncError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
