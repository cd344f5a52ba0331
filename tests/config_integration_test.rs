//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use cleos_sync::config::{load_config, Environment};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("CLEOS_SYNC_APPLICATION_LOG_LEVEL");
    std::env::remove_var("CLEOS_SYNC_APPLICATION_DRY_RUN");
    std::env::remove_var("CLEOS_SYNC_ENVIRONMENT");
    std::env::remove_var("CLEOS_SYNC_API_TOKEN");
    std::env::remove_var("CLEOS_SYNC_SERIES_TEMPLATE_ID");
    std::env::remove_var("CLEOS_SYNC_SYNC_MAX_REPORTS_PER_RUN");
    std::env::remove_var("TEST_CLEOS_API_TOKEN");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

const MINIMAL: &str = r#"
[series]
template_id = "275"

[sink]
directory = "/tmp/cleos/reports"

[checkpoint]
directory = "/tmp/cleos/state"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
environment = "production"

[application]
log_level = "debug"
dry_run = true

[api]
base_url = "https://reports.example.com/api/v1"
token = "static-token"
timeout_seconds = 10
connect_timeout_seconds = 5
tls_verify = true
report_id_header = "X-Report-Id"

[series]
template_id = "276"
first_ordered_date = "2021-06-01"

[sink]
directory = "/data/reports"
write_metadata = false

[checkpoint]
directory = "/data/state"
job_name = "weekly-clearing"

[sync]
run_timeout_seconds = 120
max_reports_per_run = 1

[logging]
local_enabled = true
local_path = "/var/log/cleos-sync"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    assert_eq!(config.base_url(), "https://reports.example.com/api/v1");
    assert_eq!(
        config.api.token.as_ref().unwrap().expose_secret().as_ref(),
        "static-token"
    );
    assert_eq!(config.api.timeout(), Duration::from_secs(10));
    assert_eq!(config.api.connect_timeout(), Duration::from_secs(5));
    assert_eq!(config.api.report_id_header, "X-Report-Id");

    let series = config.series.to_series().unwrap();
    assert_eq!(series.key(), "276_2021-06-01");

    assert_eq!(config.sink.directory, "/data/reports");
    assert!(!config.sink.write_metadata);
    assert_eq!(config.checkpoint.job_name, "weekly-clearing");
    assert_eq!(config.sync.run_timeout(), Duration::from_secs(120));
    assert_eq!(config.sync.max_reports_per_run, Some(1));

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(MINIMAL);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(
        config.base_url(),
        "https://api.dev.entur.io/cleos-reporting/api/v1"
    );
    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert!(config.api.token.is_none());
    assert!(config.api.tls_verify);
    assert_eq!(config.api.report_id_header, "X-Entur-Report-Id");
    assert_eq!(config.series.first_ordered_date, "2020-01-01");
    assert!(config.sink.write_metadata);
    assert_eq!(config.checkpoint.job_name, "daily-clearing");
    assert_eq!(config.sync.run_timeout_seconds, 540);
    assert!(config.sync.max_reports_per_run.is_none());
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_CLEOS_API_TOKEN", "substituted-token");

    let temp_file = write_config(&format!(
        "[api]\ntoken = \"${{TEST_CLEOS_API_TOKEN}}\"\n{MINIMAL}"
    ));
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(
        config.api.token.as_ref().unwrap().expose_secret().as_ref(),
        "substituted-token"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(&format!(
        "[api]\ntoken = \"${{TEST_CLEOS_API_TOKEN}}\"\n{MINIMAL}"
    ));
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_CLEOS_API_TOKEN"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("CLEOS_SYNC_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("CLEOS_SYNC_ENVIRONMENT", "staging");
    std::env::set_var("CLEOS_SYNC_API_TOKEN", "override-token");
    std::env::set_var("CLEOS_SYNC_SERIES_TEMPLATE_ID", "999");
    std::env::set_var("CLEOS_SYNC_SYNC_MAX_REPORTS_PER_RUN", "3");

    let temp_file = write_config(MINIMAL);
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(
        config.api.token.as_ref().unwrap().expose_secret().as_ref(),
        "override-token"
    );
    assert_eq!(config.series.template_id, "999");
    assert_eq!(config.sync.max_reports_per_run, Some(3));

    cleanup_env_vars();
}

#[test]
fn test_validation_rejects_disabled_tls_in_production() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(&format!(
        "environment = \"production\"\n[api]\ntls_verify = false\n{MINIMAL}"
    ));
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TLS"));
}

#[test]
fn test_validation_rejects_bad_date() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[series]
template_id = "275"
first_ordered_date = "01.01.2020"

[sink]
directory = "/tmp/cleos/reports"

[checkpoint]
directory = "/tmp/cleos/state"
"#,
    );
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("first_ordered_date"));
}

#[test]
fn test_validation_rejects_zero_report_limit() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(&format!("{MINIMAL}\n[sync]\nmax_reports_per_run = 0\n"));
    assert!(load_config(temp_file.path()).is_err());
}

#[test]
fn test_invalid_toml() {
    let temp_file = write_config("[series\ntemplate_id = ");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TOML"));
}
