//! Status command implementation
//!
//! Shows the committed checkpoint of the configured series.

use super::sync::{EXIT_CONFIG, EXIT_INIT, EXIT_SUCCESS};
use crate::adapters::checkpoint::JobFileCheckpointStore;
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Show a different template ID than the configured one
    #[arg(long)]
    pub template_id: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Some(template_id) = &self.template_id {
            config.series.template_id = template_id.clone();
        }

        let series = match config.series.to_series() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Invalid series: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store =
            JobFileCheckpointStore::new(&config.checkpoint.directory, &config.checkpoint.job_name);

        let document = match store.document(&series).await {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to read checkpoint");
                println!("   Error: {e}");
                return Ok(EXIT_INIT);
            }
        };

        println!("  Series: {series}");
        println!("  Job Document: {}", store.document_path(&series).display());

        let Some(document) = document else {
            println!("  Checkpoint: none");
            println!();
            println!("No sync history found.");
            println!("Run 'cleos-sync sync' to start fetching reports.");
            return Ok(EXIT_SUCCESS);
        };

        let cursor = match document.payload() {
            Ok(payload) => payload.cursor(),
            Err(e) => {
                println!("❌ Checkpoint payload is unreadable");
                println!("   Error: {e}");
                return Ok(EXIT_INIT);
            }
        };

        println!("  Job: {}", document.name);
        println!("  Last Committed Report: {cursor}");
        println!(
            "  Updated At: {}",
            document.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!();

        Ok(EXIT_SUCCESS)
    }
}
