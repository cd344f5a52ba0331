//! Configuration schema types
//!
//! This module defines the configuration structure for cleos-sync.

use crate::config::SecretString;
use crate::domain::ids::TemplateId;
use crate::domain::report::{Series, DATE_LAYOUT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Reporting API base path for the development environment
pub const BASE_PATH_DEV: &str = "https://api.dev.entur.io/cleos-reporting/api/v1";

/// Reporting API base path for the staging environment
pub const BASE_PATH_STAGING: &str = "https://api.staging.entur.io/cleos-reporting/api/v1";

/// Reporting API base path for the production environment
pub const BASE_PATH_PROD: &str = "https://api.entur.io/cleos-reporting/api/v1";

/// Header carrying the report identifier on a delivered report
pub const DEFAULT_REPORT_ID_HEADER: &str = "X-Entur-Report-Id";

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

impl Environment {
    /// Default reporting API base path for this environment
    pub fn base_path(&self) -> &'static str {
        match self {
            Environment::Development => BASE_PATH_DEV,
            Environment::Staging => BASE_PATH_STAGING,
            Environment::Production => BASE_PATH_PROD,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "Invalid environment '{other}'. Must be one of: development, staging, production"
            )),
        }
    }
}

/// Main cleos-sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Reporting API connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// The report series to walk
    pub series: SeriesConfig,

    /// Where fetched reports are stored
    pub sink: SinkConfig,

    /// Where the cursor checkpoint is kept
    pub checkpoint: CheckpointConfig,

    /// Sync loop settings
    #[serde(default)]
    pub sync: SyncLoopConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate(&self.environment)?;
        self.series.validate()?;
        self.sink.validate()?;
        self.checkpoint.validate()?;
        self.sync.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Effective base URL: the explicit override or the environment preset
    pub fn base_url(&self) -> String {
        self.api
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.environment.base_path().to_string())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (fetch reports but write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Reporting API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL override; the environment preset is used when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: disabling verification is refused in production.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Response header carrying the report identifier
    #[serde(default = "default_report_id_header")]
    pub report_id_header: String,
}

impl ApiConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if let Some(ref base_url) = self.base_url {
            if !base_url.is_empty()
                && !base_url.starts_with("http://")
                && !base_url.starts_with("https://")
            {
                return Err("api.base_url must start with http:// or https://".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("api.timeout_seconds must be > 0".to_string());
        }

        if self.report_id_header.trim().is_empty() {
            return Err("api.report_id_header cannot be empty".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                For development/testing, set 'environment = \"development\"' \
                or 'environment = \"staging\"'."
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Connect timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_seconds: default_timeout_seconds(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
            tls_verify: true,
            report_id_header: default_report_id_header(),
        }
    }
}

/// Series configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Report template ID
    pub template_id: String,

    /// Lower bound on report order date (YYYY-MM-DD)
    #[serde(default = "default_first_ordered_date")]
    pub first_ordered_date: String,
}

impl SeriesConfig {
    fn validate(&self) -> Result<(), String> {
        self.to_series().map(|_| ())
    }

    /// Builds the typed series from the configured strings
    pub fn to_series(&self) -> Result<Series, String> {
        let template_id = TemplateId::new(self.template_id.clone())
            .map_err(|e| format!("series.template_id: {e}"))?;
        let first_ordered_date = NaiveDate::parse_from_str(&self.first_ordered_date, DATE_LAYOUT)
            .map_err(|e| {
                format!(
                    "series.first_ordered_date '{}' is not a YYYY-MM-DD date: {e}",
                    self.first_ordered_date
                )
            })?;
        Ok(Series::new(template_id, first_ordered_date))
    }
}

/// Report sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Directory receiving report objects
    pub directory: String,

    /// Write a `.meta.json` sidecar next to every report
    #[serde(default = "default_true")]
    pub write_metadata: bool,
}

impl SinkConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("sink.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Checkpoint store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Directory holding one job document per series
    pub directory: String,

    /// Name recorded in the job document
    #[serde(default = "default_job_name")]
    pub job_name: String,
}

impl CheckpointConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("checkpoint.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Sync loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLoopConfig {
    /// Deadline for one whole run in seconds
    #[serde(default = "default_run_timeout_seconds")]
    pub run_timeout_seconds: u64,

    /// Stop after this many reports per run (unset = until exhausted)
    #[serde(default)]
    pub max_reports_per_run: Option<usize>,
}

impl SyncLoopConfig {
    fn validate(&self) -> Result<(), String> {
        if self.run_timeout_seconds == 0 {
            return Err("sync.run_timeout_seconds must be > 0".to_string());
        }
        if self.max_reports_per_run == Some(0) {
            return Err("sync.max_reports_per_run must be >= 1 when set".to_string());
        }
        Ok(())
    }

    /// Run deadline as a Duration
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_seconds)
    }
}

impl Default for SyncLoopConfig {
    fn default() -> Self {
        Self {
            run_timeout_seconds: default_run_timeout_seconds(),
            max_reports_per_run: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }

    /// Console-only logging, used by the CLI before a config file is loaded
    pub fn console_only() -> Self {
        Self {
            local_enabled: false,
            local_path: String::new(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

fn default_report_id_header() -> String {
    DEFAULT_REPORT_ID_HEADER.to_string()
}

fn default_first_ordered_date() -> String {
    "2020-01-01".to_string()
}

fn default_job_name() -> String {
    "daily-clearing".to_string()
}

fn default_run_timeout_seconds() -> u64 {
    540
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
