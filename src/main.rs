// ABOUTME: Entry point for the golive CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use golive::commands::{self, DeployArgs};
use golive::config;
use golive::error::Result;
use golive::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    let result = run(cli, &mut output).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, force)?;
            output.success("Bootstrapped deployment configuration in .golive/");
            Ok(())
        }
        Commands::Deploy {
            remote,
            branch,
            tag,
            hash,
            base,
        } => {
            let args = DeployArgs {
                remote,
                branch,
                tag,
                hash,
                base,
            };
            commands::deploy(args, output).await
        }
        Commands::Rollback { branch, tag, base } => {
            commands::rollback(&branch, tag.as_deref(), base, output).await
        }
        Commands::HealthCheck { branch, tag, base } => {
            commands::health_check(&branch, tag.as_deref(), base, output).await
        }
    }
}
