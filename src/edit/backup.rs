//! Timestamped flat-file backups and retention pruning.
//!
//! Backup names encode the full relative path of the source file with `/`
//! flattened to `__`, so a restore can land back in the right subdirectory.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub const BACKUP_DIR_NAME: &str = ".repo-pilot-backups";

const BACKUP_MARKER: &str = ".backup.";
const SEPARATOR_TOKEN: &str = "__";

/// Copy `file_path` into `backup_dir` as
/// `<flattened relative path>.backup.<timestamp>`. Backups within the same
/// second for the same file overwrite each other.
pub fn create_backup(backup_dir: &Path, file_path: &Path, relative_path: &str) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir)?;
    let flattened = relative_path.replace('/', SEPARATOR_TOKEN);
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = backup_dir.join(format!("{flattened}{BACKUP_MARKER}{timestamp}"));
    fs::copy(file_path, &backup_path)
        .with_context(|| format!("backing up {}", file_path.display()))?;
    debug!("backed up {} to {}", file_path.display(), backup_path.display());
    Ok(backup_path)
}

/// The repository-relative path a backup was taken from, or None when the
/// name does not carry the backup marker. Paths containing a literal `__`
/// are not round-trippable through the flattened name.
pub fn original_relative_path(backup_file_name: &str) -> Option<String> {
    backup_file_name
        .split_once(BACKUP_MARKER)
        .map(|(name, _)| name.replace(SEPARATOR_TOKEN, "/"))
        .filter(|name| !name.is_empty())
}

/// Delete all but the newest `keep_latest` backups per original file, ordered
/// by modification time. Returns the number of backups removed.
pub fn prune(backup_dir: &Path, keep_latest: usize) -> Result<usize> {
    if !backup_dir.exists() {
        return Ok(0);
    }

    let mut by_original: BTreeMap<String, Vec<(SystemTime, PathBuf)>> = BTreeMap::new();
    for entry in fs::read_dir(backup_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(original) = original_relative_path(file_name) else {
            continue;
        };
        let modified = entry.metadata()?.modified()?;
        by_original.entry(original).or_default().push((modified, path));
    }

    let mut removed = 0;
    for (original, mut backups) in by_original {
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in backups.into_iter().skip(keep_latest) {
            fs::remove_file(&path)
                .with_context(|| format!("removing backup {}", path.display()))?;
            debug!("pruned backup of {original}: {}", path.display());
            removed += 1;
        }
    }
    Ok(removed)
}
