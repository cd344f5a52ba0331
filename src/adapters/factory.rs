//! Adapter factory
//!
//! Builds the three collaborators of a sync run from configuration.

use crate::adapters::checkpoint::JobFileCheckpointStore;
use crate::adapters::cleos::CleosClient;
use crate::adapters::sink::DirectorySink;
use crate::adapters::traits::{CheckpointStore, ReportSink, ReportSource};
use crate::config::SyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the report source for the configured environment
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_source(config: &SyncConfig) -> Result<Arc<dyn ReportSource>> {
    let client = CleosClient::from_config(config)?;
    tracing::info!(base_url = %client.describe(), "Creating reporting API client");
    Ok(Arc::new(client))
}

/// Create the report sink
///
/// `dry_run` is combined with `application.dry_run`.
pub fn build_sink(config: &SyncConfig, dry_run: bool) -> Arc<dyn ReportSink> {
    tracing::info!(directory = %config.sink.directory, "Creating directory sink");
    Arc::new(
        DirectorySink::new(&config.sink.directory, config.sink.write_metadata)
            .with_dry_run(dry_run || config.application.dry_run),
    )
}

/// Create the checkpoint store
///
/// `dry_run` is combined with `application.dry_run`.
pub fn build_checkpoint_store(config: &SyncConfig, dry_run: bool) -> Arc<dyn CheckpointStore> {
    Arc::new(
        JobFileCheckpointStore::new(&config.checkpoint.directory, &config.checkpoint.job_name)
            .with_dry_run(dry_run || config.application.dry_run),
    )
}
