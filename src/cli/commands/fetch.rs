//! Fetch command implementation
//!
//! One-shot download of the report following a given id, written to a local
//! directory. Does not read or write checkpoints.

use super::sync::{exit_code_for, EXIT_CONFIG, EXIT_FATAL, EXIT_INIT, EXIT_SUCCESS};
use crate::adapters::cleos::CleosClient;
use crate::adapters::sink::DirectorySink;
use crate::adapters::traits::{ReportSink, ReportSource};
use crate::config::load_config;
use crate::domain::ids::{Cursor, TemplateId};
use crate::domain::report::{FetchOutcome, Series, DATE_LAYOUT};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the fetch command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Report template ID
    pub template_id: String,

    /// Fetch the report after this id (empty string for the first report)
    pub id_after: String,

    /// Lower bound on the order date (YYYY-MM-DD)
    pub first_ordered_date: String,

    /// Directory to write the report into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

impl FetchArgs {
    /// Series addressed by the positional arguments
    pub fn series(&self) -> Result<Series, String> {
        let template_id = TemplateId::new(self.template_id.clone())?;
        let date = NaiveDate::parse_from_str(&self.first_ordered_date, DATE_LAYOUT)
            .map_err(|e| format!("'{}' is not a YYYY-MM-DD date: {e}", self.first_ordered_date))?;
        Ok(Series::new(template_id, date))
    }

    /// Execute the fetch command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let series = match self.series() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Invalid arguments: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let cursor = Cursor::from_stored(self.id_after.clone());

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let client = match CleosClient::from_config(&config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to create reporting API client: {e}");
                return Ok(EXIT_INIT);
            }
        };

        tracing::info!(series = %series, cursor = %cursor, "Fetching single report");
        let started = Instant::now();

        let report = match client.fetch(&series, &cursor).await {
            FetchOutcome::Delivered(report) => report,
            FetchOutcome::Exhausted => {
                println!("ℹ️  No new reports after {cursor}, try again later");
                return Ok(EXIT_SUCCESS);
            }
            FetchOutcome::NotReady => {
                println!("⏳ The next report is still being generated, try again later");
                return Ok(EXIT_SUCCESS);
            }
            FetchOutcome::Failed(failure) => {
                eprintln!("❌ Fetch failed: {failure}");
                return Ok(exit_code_for(&failure.into_error(0)));
            }
        };

        let sink = DirectorySink::new(&self.output, false);
        let stored = match sink.store(&report).await {
            Ok(stored) => stored,
            Err(e) => {
                eprintln!("❌ Failed to write report {}: {e}", report.id);
                return Ok(EXIT_FATAL);
            }
        };

        println!(
            "✅ Successfully fetched report {} ({}) in {:.2}s",
            report.id,
            report.filename,
            started.elapsed().as_secs_f64()
        );
        println!("   Written to {}", sink.directory().join(&stored.name).display());

        Ok(EXIT_SUCCESS)
    }
}
