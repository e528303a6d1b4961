//! Context command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::utils::{parse_csv, spinner};
use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::index::RepoIndex;
use crate::select::{context_summary, format_context, select_context, SelectOptions};
use crate::utils::estimate_tokens;

#[derive(Args)]
pub struct ContextArgs {
    /// Task description to select context for
    #[arg(short, long, value_name = "TEXT")]
    pub task: String,

    /// Local directory path to select from
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Files the task explicitly refers to (comma-separated)
    #[arg(long, value_name = "FILES")]
    pub target: Option<String>,

    /// Path to config file (repo-pilot.toml or .repo-pilot.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum files in the bundle
    #[arg(long, value_name = "N")]
    pub max_files: Option<usize>,

    /// Approximate token budget for the bundle
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<u64>,

    /// Print the full bundle instead of the selection summary
    #[arg(long)]
    pub full: bool,

    /// Ignore the cache and rescan before selecting
    #[arg(long)]
    pub refresh: bool,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude: Option<String>,
}

pub fn run(args: ContextArgs) -> Result<()> {
    let mut index = RepoIndex::open(&args.path)?;
    if let Some(globs) = parse_csv(&args.exclude) {
        index.set_exclude_globs(&globs)?;
    }

    let file_config = load_config(index.root(), args.config.as_deref())?;
    let overrides = CliOverrides {
        max_files: args.max_files,
        max_tokens: args.max_tokens,
        no_backup: false,
    };
    let config = merge_cli_with_config(file_config, &overrides);

    let progress = spinner("Scanning repository...");
    index.scan(args.refresh)?;
    progress.finish_and_clear();

    let targets = parse_csv(&args.target).unwrap_or_default();
    let options = SelectOptions { max_files: config.max_files, max_tokens: config.max_tokens };
    let selected = select_context(&index, &args.task, &targets, &options);

    if args.full {
        println!("{}", format_context(&mut index, &selected));
    } else {
        println!("{}", context_summary(&index, &selected));
        let total_tokens: u64 = selected
            .iter()
            .filter_map(|result| index.files().get(&result.relative_path))
            .map(|record| estimate_tokens(record.size_bytes))
            .sum();
        println!("Estimated tokens: {total_tokens} (budget {})", config.max_tokens);
    }

    Ok(())
}
