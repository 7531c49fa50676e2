//! CLI definitions for Plugboard.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Plugboard CLI.
#[derive(Parser)]
#[command(name = "plugboard")]
#[command(about = "Reference host for the Plugboard package registry")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/plugboard.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start the registry, run one chat command, then stop (default)
    Run {
        /// Chat command line, e.g. "echo hello"
        #[arg(long, default_value = "help")]
        command: String,
    },

    /// List installed packages and their contributions
    List,
}
