//! agentsync CLI
//!
//! Synchronizes a source-of-truth directory of agent configuration into the
//! project directories of one or more host applications.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // A second subscriber only happens in tests; ignore it
    let _ = agentsync_adapters::logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let cwd = std::env::current_dir()?;
    let session = context::session(&cli, &cwd)?;

    match cli.command {
        Commands::Status { json } => commands::run_status(&session, json),
        Commands::Diff { json } => commands::run_diff(&session, json).await,
        Commands::Sync {
            dry_run,
            link,
            prune,
        } => commands::run_sync(&session, dry_run, link, prune).await,
        Commands::Apply { dry_run } => commands::run_apply(&session, dry_run).await,
        Commands::Backport { dry_run } => commands::run_backport(&session, dry_run).await,
    }
}
