// cleos-sync - CLEOS partner report synchronisation
// Copyright (c) 2025 Cleos Sync Contributors
// Licensed under the MIT License

//! # cleos-sync
//!
//! Walks an append-only series of partner reports on the CLEOS reporting API,
//! stores every report durably and advances a checkpoint so the next
//! invocation resumes right after the last stored report.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Sync state machine, engine and checkpoint commit protocol
//! - [`adapters`] - Reporting API client, report sink and checkpoint store
//! - [`domain`] - Identifiers, reports, outcomes and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cleos_sync::adapters::factory::{build_checkpoint_store, build_sink, build_source};
//! use cleos_sync::config::load_config;
//! use cleos_sync::core::{CheckpointManager, SyncLoop, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("cleos-sync.toml")?;
//!     let series = config.series.to_series()?;
//!
//!     let sync_loop = SyncLoop::new(
//!         build_source(&config)?,
//!         build_sink(&config, false),
//!         CheckpointManager::new(build_checkpoint_store(&config, false)),
//!         SyncOptions::from_config(&config.sync),
//!     );
//!
//!     let summary = sync_loop.run_from_checkpoint(&series).await?;
//!     println!("Stored {} report(s), checkpoint at {}", summary.delivered, summary.final_cursor);
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery guarantees
//!
//! The checkpoint is written once per run, after every report of the run is
//! stored. A run that fails writes no checkpoint, so the next run may store
//! some reports a second time; the sink overwrites by object name. A run
//! never skips a report that was not committed.
//!
//! ## Error Handling
//!
//! Library code returns [`domain::SyncError`]. Run failures carry a
//! [`domain::FailureKind`] that tells callers whether to retry, reconfigure
//! or expect duplicates:
//!
//! ```rust
//! use cleos_sync::domain::{Failure, FailureKind};
//!
//! let error = Failure::new(FailureKind::SeriesClosed, "410 Gone").into_error(0);
//! assert!(error.kind().unwrap().is_series_closed());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
