//! Edit engine: applies proposed file changes transactionally per file, with
//! pre-mutation backups, per-edit failure reporting, and rollback.

use crate::domain::{Edit, EditOp, EditOutcome};
use crate::utils::read_text_lossy;
use anyhow::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub mod backup;
pub mod diff;

pub use backup::BACKUP_DIR_NAME;

/// Why an edit was rejected before application.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file path must be relative")]
    AbsolutePath,
    #[error("file path resolves outside the repository")]
    PathEscapesRoot,
    #[error("{0} requires {1}")]
    MissingField(EditOp, &'static str),
}

/// Applies edits against one repository root. Backups land under a hidden
/// directory inside the repository; callers serialize edit batches per
/// repository, there is no locking.
pub struct EditEngine {
    repo_root: PathBuf,
    backup_dir: PathBuf,
    create_backups: bool,
}

impl EditEngine {
    pub fn new(repo_root: impl Into<PathBuf>, create_backups: bool) -> Result<Self> {
        let repo_root = repo_root.into();
        let backup_dir = repo_root.join(BACKUP_DIR_NAME);
        if create_backups {
            fs::create_dir_all(&backup_dir)?;
        }
        Ok(EditEngine { repo_root, backup_dir, create_backups })
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Apply a batch of edits, grouped per target file in submission order.
    ///
    /// Per-edit failures never abort sibling edits; an I/O failure while
    /// processing a file fails that whole group but leaves other files in the
    /// batch untouched. Never returns an error for partial failure: callers
    /// inspect `EditOutcome::failed`.
    pub fn apply_edits(&self, edits: Vec<Edit>) -> EditOutcome {
        let mut groups: Vec<(String, Vec<Edit>)> = Vec::new();
        for edit in edits {
            match groups.iter_mut().find(|(path, _)| *path == edit.path) {
                Some((_, group)) => group.push(edit),
                None => groups.push((edit.path.clone(), vec![edit])),
            }
        }

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        let mut backup_path = None;

        for (path, group) in groups {
            match self.process_file(&path, group.clone()) {
                Ok(outcome) => {
                    applied.extend(outcome.applied);
                    failed.extend(outcome.failed);
                    if outcome.backup.is_some() {
                        backup_path = outcome.backup;
                    }
                }
                Err(err) => {
                    warn!("failed processing {path}: {err:#}");
                    for mut edit in group {
                        edit.success = false;
                        edit.error = Some(err.to_string());
                        failed.push(edit);
                    }
                }
            }
        }

        let diff = if applied.is_empty() { None } else { Some(diff::summary(&applied)) };

        EditOutcome { success: failed.is_empty(), applied, failed, backup_path, diff }
    }

    fn process_file(&self, path: &str, group: Vec<Edit>) -> Result<FileOutcome> {
        let full_path = self.repo_root.join(path);

        let backup = if self.create_backups && full_path.exists() {
            Some(backup::create_backup(&self.backup_dir, &full_path, path)?)
        } else {
            None
        };

        let mut content =
            if full_path.exists() { read_text_lossy(&full_path)? } else { String::new() };

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for mut edit in group {
            apply_one(&mut content, &mut edit);
            if edit.success {
                applied.push(edit);
            } else {
                failed.push(edit);
            }
        }

        if !applied.is_empty() {
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, &content)?;
            debug!("updated {path}");
        }

        Ok(FileOutcome { applied, failed, backup })
    }

    /// Build an edit from generation-service output for one file. Always a
    /// FullReplace, even when prior content exists; a structural-diff
    /// strategy deliberately stays out of scope.
    pub fn edit_from_generated(&self, path: &str, new_content: &str) -> Edit {
        let full_path = self.repo_root.join(path);
        let old_content = if full_path.exists() {
            read_text_lossy(&full_path).ok().filter(|content| !content.is_empty())
        } else {
            None
        };

        Edit {
            path: path.to_string(),
            op: EditOp::FullReplace,
            old_content,
            new_content: Some(new_content.to_string()),
            line_start: None,
            line_end: None,
            success: false,
            error: None,
        }
    }

    /// Reject path traversal and per-operation missing fields before any
    /// mutation happens.
    pub fn validate(&self, edit: &Edit) -> Result<(), ValidationError> {
        let path = Path::new(&edit.path);
        if path.is_absolute() {
            return Err(ValidationError::AbsolutePath);
        }

        // Lexical confinement check; the target may not exist yet, so
        // canonicalization is not an option.
        let mut depth = 0i32;
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(ValidationError::AbsolutePath)
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ValidationError::PathEscapesRoot);
                    }
                }
                Component::Normal(_) => depth += 1,
            }
        }

        let missing = |field| Err(ValidationError::MissingField(edit.op, field));
        match edit.op {
            EditOp::FullReplace => {
                if edit.new_content.is_none() {
                    return missing("new_content");
                }
            }
            EditOp::SearchReplace => {
                let empty = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
                if empty(&edit.old_content) || empty(&edit.new_content) {
                    return missing("old_content and new_content");
                }
            }
            EditOp::InsertLines => {
                if edit.new_content.is_none() || edit.line_start.is_none() {
                    return missing("new_content and line_start");
                }
            }
            EditOp::DeleteLines => {
                if edit.line_start.is_none() || edit.line_end.is_none() {
                    return missing("line_start and line_end");
                }
            }
        }

        Ok(())
    }

    /// Restore a file from a backup. Returns false (not an error) when the
    /// backup is missing or its name does not follow the backup convention.
    pub fn rollback(&self, backup_path: &Path) -> Result<bool> {
        if !backup_path.exists() {
            warn!("backup not found: {}", backup_path.display());
            return Ok(false);
        }

        let file_name = backup_path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some(original) = backup::original_relative_path(file_name) else {
            warn!("not a recognized backup name: {file_name}");
            return Ok(false);
        };

        let target = self.repo_root.join(&original);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(backup_path, &target)?;
        debug!("restored {} from {}", target.display(), backup_path.display());
        Ok(true)
    }

    /// Delete all but the newest `keep_latest` backups per original file.
    pub fn prune_backups(&self, keep_latest: usize) -> Result<usize> {
        backup::prune(&self.backup_dir, keep_latest)
    }
}

struct FileOutcome {
    applied: Vec<Edit>,
    failed: Vec<Edit>,
    backup: Option<PathBuf>,
}

/// One edit against the progressively mutated content. Pending -> Applied or
/// Failed, terminal; no retries.
fn apply_one(content: &mut String, edit: &mut Edit) {
    match edit.op {
        EditOp::FullReplace => {
            *content = edit.new_content.clone().unwrap_or_default();
            edit.success = true;
        }
        EditOp::SearchReplace => match edit.old_content.as_deref() {
            Some(old) if !old.is_empty() && content.contains(old) => {
                let new = edit.new_content.as_deref().unwrap_or_default();
                *content = content.replacen(old, new, 1);
                edit.success = true;
            }
            _ => {
                edit.success = false;
                edit.error = Some("old content not found in file".to_string());
            }
        },
        EditOp::InsertLines => {
            let index = edit.line_start.unwrap_or(usize::MAX);
            let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
            if index <= lines.len() {
                lines.insert(index, edit.new_content.clone().unwrap_or_default());
                *content = lines.join("\n");
                edit.success = true;
            } else {
                edit.success = false;
                edit.error = Some(format!("invalid line number: {index}"));
            }
        }
        EditOp::DeleteLines => {
            let start = edit.line_start.unwrap_or(usize::MAX);
            let end = edit.line_end.unwrap_or(usize::MAX);
            let mut lines: Vec<String> = content.split('\n').map(String::from).collect();
            if start < lines.len() && end <= lines.len() {
                if end > start {
                    lines.drain(start..end);
                }
                *content = lines.join("\n");
                edit.success = true;
            } else {
                edit.success = false;
                edit.error = Some(format!("invalid line range: {start}-{end}"));
            }
        }
    }
}
