//! Validate config command implementation

use super::sync::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as its last step
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Environment: {}", config.environment);
        println!("  Reporting API: {}", config.base_url());
        println!(
            "  API Token: {}",
            if config.api.token.is_some() { "set" } else { "not set" }
        );
        println!("  TLS Verify: {}", config.api.tls_verify);
        println!("  Template ID: {}", config.series.template_id);
        println!("  First Ordered Date: {}", config.series.first_ordered_date);
        println!("  Sink Directory: {}", config.sink.directory);
        println!("  Checkpoint Directory: {}", config.checkpoint.directory);
        println!("  Job Name: {}", config.checkpoint.job_name);
        println!("  Run Timeout: {}s", config.sync.run_timeout_seconds);
        println!(
            "  Max Reports Per Run: {}",
            config
                .sync
                .max_reports_per_run
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unlimited".to_string())
        );
        println!();

        Ok(EXIT_SUCCESS)
    }
}
