//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// cleos-sync - mirror partner reports into durable storage
#[derive(Parser, Debug)]
#[command(name = "cleos-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Cleos Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cleos-sync.toml", env = "CLEOS_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLEOS_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch new reports for the configured series and advance the checkpoint
    Sync(commands::sync::SyncArgs),

    /// Fetch a single report into a directory without touching checkpoints
    Fetch(commands::fetch::FetchArgs),

    /// Show the committed checkpoint
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
