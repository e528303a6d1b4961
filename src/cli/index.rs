//! Index command implementation

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

use super::utils::{parse_csv, spinner};
use crate::index::RepoIndex;

#[derive(Args)]
pub struct IndexArgs {
    /// Local directory path to index
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Ignore the cache and rescan everything
    #[arg(long)]
    pub refresh: bool,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also list files matching this name fragment
    #[arg(long, value_name = "PATTERN")]
    pub find: Option<String>,

    /// Exclude paths matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude: Option<String>,
}

pub fn run(args: IndexArgs) -> Result<()> {
    let mut index = RepoIndex::open(&args.path)?;
    if let Some(globs) = parse_csv(&args.exclude) {
        index.set_exclude_globs(&globs)?;
    }

    let progress = spinner("Scanning repository...");
    index.scan(args.refresh)?;
    progress.finish_and_clear();

    let summary = index.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", style(format!("Repository: {}", index.root().display())).bold());
    println!("Project type: {}", summary.project_type);
    println!("Files: {} total, {} code", summary.total_files, summary.code_files);
    println!("Lines: {}", summary.total_lines);
    println!("Size: {} MB", summary.total_size_mb);

    if !summary.by_extension.is_empty() {
        println!("By extension:");
        let mut extensions: Vec<_> = summary.by_extension.iter().collect();
        extensions.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        for (extension, stats) in extensions.into_iter().take(10) {
            println!("  {}: {} files, {} lines", extension, stats.count, stats.lines);
        }
    }

    if !summary.dependencies.is_empty() {
        println!("Dependencies:");
        for (manager, packages) in &summary.dependencies {
            println!("  {}: {} packages", manager, packages.len());
        }
    }

    if let Some(pattern) = &args.find {
        let matches = index.find_files(pattern);
        println!("Matches for '{}': {}", pattern, matches.len());
        for record in matches {
            println!("  {}", record.relative_path);
        }
    }

    Ok(())
}
