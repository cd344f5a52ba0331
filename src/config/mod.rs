//! Configuration management for cleos-sync.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `CLEOS_SYNC_*`
//! environment overrides, defaults for optional settings and validation on
//! load.
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [api]
//! token = "${CLEOS_API_TOKEN}"
//!
//! [series]
//! template_id = "275"
//! first_ordered_date = "2020-01-01"
//!
//! [sink]
//! directory = "/var/lib/cleos-sync/reports"
//!
//! [checkpoint]
//! directory = "/var/lib/cleos-sync/state"
//!
//! [sync]
//! run_timeout_seconds = 540
//! ```
//!
//! ```rust,no_run
//! use cleos_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cleos-sync.toml")?;
//! println!("Reporting API: {}", config.base_url());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApiConfig, ApplicationConfig, CheckpointConfig, Environment, LoggingConfig, SeriesConfig,
    SinkConfig, SyncConfig, SyncLoopConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
