//! Init command implementation
//!
//! Generates a sample configuration file.

use super::sync::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cleos-sync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing cleos-sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your template id and directories", self.output);
                println!("  2. Export the API token: CLEOS_API_TOKEN=<bearer token>");
                println!("     (or put it in a .env file next to the configuration)");
                println!("  3. Validate configuration: cleos-sync validate-config");
                println!("  4. Run a sync: cleos-sync sync");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    pub fn generate_minimal_config() -> String {
        r#"# cleos-sync configuration
# Fetches partner reports and checkpoints the last stored report id

environment = "development"  # development | staging | production

[application]
log_level = "info"
dry_run = false

[api]
token = "${CLEOS_API_TOKEN}"

[series]
template_id = "275"
first_ordered_date = "2020-01-01"

[sink]
directory = "./reports"

[checkpoint]
directory = "./state"
"#
        .to_string()
    }

    /// Generate configuration with every option documented
    pub fn generate_config_with_examples() -> String {
        r#"# cleos-sync configuration
# Fetches partner reports and checkpoints the last stored report id
#
# Values may reference environment variables with ${VAR_NAME}.
# Any setting can be overridden with CLEOS_SYNC_<SECTION>_<KEY>,
# e.g. CLEOS_SYNC_SERIES_TEMPLATE_ID=276.

# Selects the reporting API base path
environment = "development"  # development | staging | production

[application]
# trace | debug | info | warn | error
log_level = "info"
# Fetch reports but write neither reports nor checkpoints
dry_run = false

[api]
# Overrides the base path implied by `environment`
# base_url = "https://api.dev.entur.io/cleos-reporting/api/v1"

# Bearer token sent with every request
token = "${CLEOS_API_TOKEN}"

# Request and connect timeouts
timeout_seconds = 60
connect_timeout_seconds = 30

# Accept invalid certificates (never allowed in production)
tls_verify = true

# Response header carrying the report id
report_id_header = "X-Entur-Report-Id"

[series]
# Report template to walk
template_id = "275"
# Lower bound on the order date of reports (YYYY-MM-DD)
first_ordered_date = "2020-01-01"

[sink]
# Reports are written as <directory>/<report id>_<filename>
directory = "./reports"
# Write <object>.meta.json with content type, size and sha256
write_metadata = true

[checkpoint]
# One job document per series: <directory>/<template id>_<date>.json
directory = "./state"
job_name = "daily-clearing"

[sync]
# Deadline for a whole run; fetches and writes are cancelled after it
run_timeout_seconds = 540
# Stop after this many reports (omit to run until exhausted)
# max_reports_per_run = 1

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use tempfile::TempDir;

    #[test]
    fn test_minimal_config_is_valid() {
        let config: SyncConfig = toml::from_str(&InitArgs::generate_minimal_config()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.series.template_id, "275");
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: SyncConfig =
            toml::from_str(&InitArgs::generate_config_with_examples()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.checkpoint.job_name, "daily-clearing");
        assert!(config.sink.write_metadata);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cleos-sync.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&output).unwrap().contains("[series]"));
    }
}
