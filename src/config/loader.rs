//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "CLEOS_SYNC";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (CLEOS_SYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use cleos_sync::config::loader::load_config;
///
/// let config = load_config("cleos-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported in
/// a single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

/// Applies environment variable overrides using the CLEOS_SYNC_* prefix
///
/// Variables follow the pattern CLEOS_SYNC_<SECTION>_<KEY>, for example
/// CLEOS_SYNC_API_TOKEN or CLEOS_SYNC_SERIES_TEMPLATE_ID.
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_var("APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }
    if let Some(val) = env_var("ENVIRONMENT") {
        config.environment = super::schema::Environment::from_str(&val)
            .map_err(SyncError::Configuration)?;
    }

    // API overrides
    if let Some(val) = env_var("API_BASE_URL") {
        config.api.base_url = Some(val);
    }
    if let Some(val) = env_var("API_TOKEN") {
        config.api.token = Some(secret_string(val));
    }
    if let Some(val) = env_var("API_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.api.timeout_seconds = timeout;
        }
    }
    if let Some(val) = env_var("API_TLS_VERIFY") {
        config.api.tls_verify = val.parse().unwrap_or(true);
    }

    // Series overrides
    if let Some(val) = env_var("SERIES_TEMPLATE_ID") {
        config.series.template_id = val;
    }
    if let Some(val) = env_var("SERIES_FIRST_ORDERED_DATE") {
        config.series.first_ordered_date = val;
    }

    // Storage overrides
    if let Some(val) = env_var("SINK_DIRECTORY") {
        config.sink.directory = val;
    }
    if let Some(val) = env_var("CHECKPOINT_DIRECTORY") {
        config.checkpoint.directory = val;
    }
    if let Some(val) = env_var("CHECKPOINT_JOB_NAME") {
        config.checkpoint.job_name = val;
    }

    // Sync loop overrides
    if let Some(val) = env_var("SYNC_RUN_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.sync.run_timeout_seconds = timeout;
        }
    }
    if let Some(val) = env_var("SYNC_MAX_REPORTS_PER_RUN") {
        if let Ok(max) = val.parse() {
            config.sync.max_reports_per_run = Some(max);
        }
    }

    // Logging overrides
    if let Some(val) = env_var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = env_var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CLEOS_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${CLEOS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("CLEOS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CLEOS_LOADER_MISSING_VAR");
        let input = "token = \"${CLEOS_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("CLEOS_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("CLEOS_LOADER_COMMENTED_VAR");
        let input = "# token = \"${CLEOS_LOADER_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
environment = "staging"

[application]
log_level = "info"

[series]
template_id = "275"

[sink]
directory = "/tmp/cleos/reports"

[checkpoint]
directory = "/tmp/cleos/state"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.series.template_id, "275");
        assert_eq!(config.series.first_ordered_date, "2020-01-01");
        assert_eq!(
            config.base_url(),
            "https://api.staging.entur.io/cleos-reporting/api/v1"
        );
    }
}
