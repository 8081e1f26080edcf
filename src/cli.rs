// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "golive")]
#[command(about = "Zero-downtime release deployment for web applications")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(long, global = true)]
    pub quiet: bool,

    /// JSON lines output for scripting
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bootstrap the .golive configuration files
    Init {
        /// Overwrite existing configuration files
        #[arg(long)]
        force: bool,
    },

    /// Deploy a branch or tag as a new release
    Deploy {
        /// Clone URL of the repository to deploy
        #[arg(long)]
        remote: String,

        /// Branch or ref to deploy
        #[arg(long)]
        branch: String,

        /// Tag to deploy (routes to the tagged environment)
        #[arg(long)]
        tag: Option<String>,

        /// Explicit commit hash to check out
        #[arg(long)]
        hash: Option<String>,

        /// Base directory holding domain roots (defaults to ~/domains)
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Roll the live release back to the previous one
    Rollback {
        /// Branch or ref the live release was deployed from
        #[arg(long)]
        branch: String,

        /// Tag the live release was deployed from
        #[arg(long)]
        tag: Option<String>,

        /// Base directory holding domain roots (defaults to ~/domains)
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Probe the live release over HTTP
    HealthCheck {
        /// Branch or ref the live release was deployed from
        #[arg(long)]
        branch: String,

        /// Tag the live release was deployed from
        #[arg(long)]
        tag: Option<String>,

        /// Base directory holding domain roots (defaults to ~/domains)
        #[arg(long)]
        base: Option<PathBuf>,
    },
}
