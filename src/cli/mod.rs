//! Command-line interface for repo-pilot
//!
//! Provides `index`, `context`, `apply`, `rollback`, and `prune` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod apply;
mod backups;
mod context;
mod index;
mod utils;

/// Turn a repository plus a task description into a ranked context bundle,
/// and merge generated files back in safely
#[derive(Parser)]
#[command(name = "repo-pilot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a repository and build (or refresh) its file catalog
    Index(index::IndexArgs),

    /// Select and print the context bundle for a task
    Context(Box<context::ContextArgs>),

    /// Apply generated file output to the repository
    Apply(apply::ApplyArgs),

    /// Restore a file from a backup
    Rollback(backups::RollbackArgs),

    /// Delete old backups, keeping the newest per file
    Prune(backups::PruneArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls
    // back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Index(args) => index::run(args),
        Commands::Context(args) => context::run(*args),
        Commands::Apply(args) => apply::run(args),
        Commands::Rollback(args) => backups::run_rollback(args),
        Commands::Prune(args) => backups::run_prune(args),
    }
}
