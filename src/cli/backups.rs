//! Rollback and prune command implementations

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::edit::EditEngine;

#[derive(Args)]
pub struct RollbackArgs {
    /// Backup file to restore from
    #[arg(short, long, value_name = "FILE")]
    pub backup: PathBuf,

    /// Repository to restore into
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct PruneArgs {
    /// Repository whose backups to prune
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Backups to keep per original file (default from config)
    #[arg(short, long, value_name = "N")]
    pub keep: Option<usize>,

    /// Path to config file (repo-pilot.toml or .repo-pilot.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run_rollback(args: RollbackArgs) -> Result<()> {
    let engine = EditEngine::new(&args.path, false)?;
    if engine.rollback(&args.backup)? {
        println!("Restored from {}", args.backup.display());
        Ok(())
    } else {
        anyhow::bail!("no usable backup at {}", args.backup.display())
    }
}

pub fn run_prune(args: PruneArgs) -> Result<()> {
    let file_config = load_config(&args.path, args.config.as_deref())?;
    let config = merge_cli_with_config(file_config, &CliOverrides::default());
    let keep = args.keep.unwrap_or(config.keep_backups);

    let engine = EditEngine::new(&args.path, false)?;
    let removed = engine.prune_backups(keep)?;
    println!("Pruned {removed} backup(s), keeping the newest {keep} per file");
    Ok(())
}
