//! External system integrations
//!
//! The sync loop talks to three collaborators through the traits in
//! [`traits`]:
//!
//! - [`cleos`] - partner reporting API over HTTP ([`ReportSource`])
//! - [`sink`] - directory-backed object sink ([`ReportSink`])
//! - [`checkpoint`] - job-document checkpoint store ([`CheckpointStore`])
//!
//! [`factory`] wires them up from a [`SyncConfig`](crate::config::SyncConfig).
//!
//! ```rust,no_run
//! use cleos_sync::adapters::factory::{build_checkpoint_store, build_sink, build_source};
//! use cleos_sync::config::load_config;
//!
//! # fn example() -> cleos_sync::domain::Result<()> {
//! let config = load_config("cleos-sync.toml")?;
//! let source = build_source(&config)?;
//! let sink = build_sink(&config, false);
//! let checkpoints = build_checkpoint_store(&config, false);
//! # Ok(())
//! # }
//! ```

pub(crate) mod atomic;
pub mod checkpoint;
pub mod cleos;
pub mod factory;
pub mod sink;
pub mod traits;

pub use traits::{CheckpointStore, ReportSink, ReportSource, StoredObject};
