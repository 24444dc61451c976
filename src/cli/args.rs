//! CLI argument definitions using clap
//!
//! Commands:
//! - agora start --config <path>
//! - agora check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agora - forum backend with live updates
#[derive(Parser, Debug)]
#[command(name = "agora")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the forum server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./agora.json")]
        config: PathBuf,
    },

    /// Validate the configuration and entity descriptors, then exit
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./agora.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
