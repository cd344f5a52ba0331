//! Sync command implementation
//!
//! Runs one invocation of the fetch-and-checkpoint loop for the configured
//! series.

use crate::adapters::factory::{build_checkpoint_store, build_sink, build_source};
use crate::config::load_config;
use crate::core::state::{CheckpointManager, TriggerEvent};
use crate::core::sync::{SyncLoop, SyncOptions};
use crate::domain::errors::{FailureKind, SyncError};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the series has been closed by the service
pub const EXIT_SERIES_CLOSED: i32 = 3;
/// Exit code for initialization or connection errors
pub const EXIT_INIT: i32 = 4;
/// Exit code for fatal run failures
pub const EXIT_FATAL: i32 = 5;
/// Exit code after a shutdown signal (SIGINT convention)
pub const EXIT_CANCELLED: i32 = 130;

/// Arguments for the sync command
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Trigger event JSON file; its payload is checked against the checkpoint,
    /// which remains the resume point
    #[arg(long, value_name = "FILE")]
    pub trigger: Option<PathBuf>,

    /// Dry run mode - fetch reports without writing reports or checkpoints
    #[arg(long)]
    pub dry_run: bool,

    /// Stop after this many reports
    #[arg(long, value_name = "N")]
    pub max_reports: Option<usize>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Some(max) = self.max_reports {
            tracing::info!(max_reports = max, "Overriding report limit from CLI");
            config.sync.max_reports_per_run = Some(max);
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let series = match config.series.to_series() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Invalid series: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let trigger = match &self.trigger {
            Some(path) => match read_trigger(path).await {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Invalid trigger event");
                    eprintln!("❌ Invalid trigger event {}: {e}", path.display());
                    return Ok(EXIT_CONFIG);
                }
            },
            None => None,
        };

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - No reports or checkpoints will be written");
            println!();
        }

        let source = match build_source(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create reporting API client");
                eprintln!("❌ Failed to initialize sync: {e}");
                return Ok(EXIT_INIT);
            }
        };
        let sink = build_sink(&config, self.dry_run);
        let checkpoints = CheckpointManager::new(build_checkpoint_store(&config, self.dry_run));

        let options =
            SyncOptions::from_config(&config.sync).with_dry_run(config.application.dry_run);
        let sync_loop =
            SyncLoop::new(source, sink, checkpoints, options).with_shutdown(shutdown_signal);

        println!("🚀 Syncing series {series}...");

        let result = match &trigger {
            Some(event) => sync_loop.run_from_trigger(&series, event).await,
            None => sync_loop.run_from_checkpoint(&series).await,
        };

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                report_failure(&e);
                return Ok(exit_code_for(&e));
            }
        };

        println!();
        println!("📊 Sync Summary:");
        println!("  Series: {}", summary.series);
        println!("  Started After: {}", summary.seed);
        println!("  Reports Stored: {}", summary.delivered);
        for object in &summary.stored {
            println!("    - {} ({} bytes)", object.name, object.bytes);
        }
        println!("  Bytes: {}", summary.bytes);
        println!("  Stopped Because: {}", summary.outcome);
        println!("  Checkpoint: {}", summary.checkpoint_status());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();
        println!("✅ Sync completed successfully!");

        Ok(EXIT_SUCCESS)
    }
}

async fn read_trigger(path: &Path) -> crate::domain::Result<TriggerEvent> {
    let contents = tokio::fs::read_to_string(path).await?;
    TriggerEvent::from_json(&contents)
}

fn report_failure(error: &SyncError) {
    match error.kind() {
        Some(FailureKind::SeriesClosed) => {
            eprintln!("⛔ {error}");
            eprintln!("   The series will not produce further reports.");
            eprintln!("   Disable this job or update series.template_id.");
        }
        Some(FailureKind::Cancelled) => {
            println!();
            println!("⚠️  Sync interrupted. No checkpoint was written.");
            println!("   Reports stored in this run will be fetched again on the next run.");
        }
        Some(kind) if kind.duplicate_risk() => {
            eprintln!("❌ {error}");
            eprintln!("   Stored reports were not checkpointed and will be delivered again.");
        }
        _ => eprintln!("❌ Sync failed: {error}"),
    }
}

/// Process exit code for a failed sync
pub fn exit_code_for(error: &SyncError) -> i32 {
    match error {
        SyncError::RunFailed { kind, .. } => match kind {
            FailureKind::SeriesClosed => EXIT_SERIES_CLOSED,
            FailureKind::Cancelled => EXIT_CANCELLED,
            _ => EXIT_FATAL,
        },
        SyncError::Configuration(_) | SyncError::Validation(_) => EXIT_CONFIG,
        _ => EXIT_INIT,
    }
}
