//! Apply command implementation
//!
//! Consumes generation-service output (a JSON file listing full file bodies)
//! and merges it into the repository through the edit engine.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::edit::EditEngine;

#[derive(Args)]
pub struct ApplyArgs {
    /// JSON file with generated output: {"files": [{"path", "content"}], "summary"}
    #[arg(short, long, value_name = "FILE")]
    pub files: PathBuf,

    /// Repository to apply the output to
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Path to config file (repo-pilot.toml or .repo-pilot.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip pre-edit backups
    #[arg(long)]
    pub no_backup: bool,

    /// Validate and list the planned edits without touching any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedOutput {
    files: Vec<GeneratedFile>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedFile {
    path: String,
    content: String,
}

pub fn run(args: ApplyArgs) -> Result<()> {
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("repository path does not exist: {}", args.path.display()))?;

    let file_config = load_config(&root, args.config.as_deref())?;
    let overrides =
        CliOverrides { max_files: None, max_tokens: None, no_backup: args.no_backup };
    let config = merge_cli_with_config(file_config, &overrides);

    let content = fs::read_to_string(&args.files)
        .with_context(|| format!("failed reading generated output: {}", args.files.display()))?;
    let output: GeneratedOutput = serde_json::from_str(&content)
        .with_context(|| format!("invalid generated output JSON: {}", args.files.display()))?;

    if output.files.is_empty() {
        anyhow::bail!("generated output contains no files");
    }

    let engine = EditEngine::new(&root, config.create_backups && !args.dry_run)?;

    let mut edits = Vec::new();
    for file in &output.files {
        let edit = engine.edit_from_generated(&file.path, &file.content);
        engine
            .validate(&edit)
            .with_context(|| format!("rejected edit for {}", file.path))?;
        edits.push(edit);
    }

    if let Some(summary) = &output.summary {
        println!("{}", style(summary).bold());
    }

    if args.dry_run {
        println!("Would apply {} file(s):", edits.len());
        for edit in &edits {
            let kind = if edit.old_content.is_some() { "update" } else { "create" };
            println!("  {} {}", kind, edit.path);
        }
        return Ok(());
    }

    let outcome = engine.apply_edits(edits);

    if let Some(diff) = &outcome.diff {
        println!("{diff}");
    }
    println!("Applied: {}", outcome.applied.len());
    if let Some(backup_path) = &outcome.backup_path {
        println!("Backup: {}", backup_path.display());
    }

    if !outcome.failed.is_empty() {
        for edit in &outcome.failed {
            eprintln!(
                "{} {}: {}",
                style("failed").red(),
                edit.path,
                edit.error.as_deref().unwrap_or("unknown error")
            );
        }
        anyhow::bail!("{} edit(s) failed", outcome.failed.len());
    }

    Ok(())
}
