//! repo-pilot: turn a repository plus a task description into a ranked
//! context bundle, and merge generated files back in safely.

use anyhow::Result;

fn main() -> Result<()> {
    repo_pilot::cli::run()
}
