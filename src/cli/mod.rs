//! CLI interface for poly-copy
//!
//! Provides subcommands for:
//! - `run`: Start the copy-trading pipeline
//! - `status`: Show current state
//! - `config`: Show configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "poly-copy")]
#[command(about = "Copy-trading pipeline for Polymarket leader accounts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the copy-trading pipeline
    Run(RunArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}
