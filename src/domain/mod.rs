//! Core data model shared across the indexer, selector, and edit engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Cache schema version. A mismatch always triggers a full rescan; there is no
/// migration logic.
pub const CACHE_VERSION: &str = "1.0";

/// Code files at or above this size get metadata only; content is loaded
/// lazily on first request.
pub const CONTENT_LOAD_CAP: u64 = 500_000;

/// Files smaller than this get a flat scoring bonus.
pub const SMALL_FILE_BYTES: u64 = 10_000;

/// Directory names pruned before descent, in addition to any dot-prefixed
/// directory.
pub const IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".pytest_cache",
    "venv",
    "env",
    ".venv",
    ".env",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".coverage",
    "htmlcov",
    ".idea",
    ".vscode",
    ".DS_Store",
    "tmp",
    "temp",
    "cache",
];

/// Exact filenames skipped during a scan.
pub const IGNORE_FILES: &[&str] = &[
    ".DS_Store",
    "package-lock.json",
    "yarn.lock",
    "poetry.lock",
    ".env",
    ".env.local",
    ".env.production",
];

/// Dotfiles that survive the hidden-file filter.
pub const ALLOWED_DOTFILES: &[&str] = &[".gitignore", ".dockerignore"];

/// Extensions classified as code/text worth bundling.
pub const CODE_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".py", ".rb", ".php", ".java", ".html", ".css", ".scss",
    ".sass", ".less", ".json", ".xml", ".yaml", ".yml", ".md", ".txt", ".vue", ".svelte", ".go",
    ".rs", ".c", ".cpp", ".h", ".sh", ".bash",
];

/// Extensions never worth opening.
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".ico", ".svg", ".pdf", ".zip", ".tar", ".gz", ".rar",
    ".exe", ".dll", ".so", ".dylib", ".mp3", ".mp4", ".avi", ".mov", ".woff", ".woff2", ".ttf",
    ".eot",
];

/// Fatal preconditions surfaced by the core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("repository path does not exist: {0}")]
    MissingRoot(PathBuf),
}

/// One indexed file. `content`/`content_hash` are present only when `is_code`
/// holds and the file was under [`CONTENT_LOAD_CAP`] at scan time; larger
/// files load lazily through `RepoIndex::get_content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative_path: String,
    pub size_bytes: u64,
    pub extension: String,
    pub is_code: bool,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub line_count: usize,
}

/// A scored catalog entry. Holds the catalog key rather than a borrow so the
/// caller can keep mutating the index (lazy content loads) while iterating
/// results. Never persisted.
#[derive(Debug, Clone)]
pub struct RelevanceResult {
    pub relative_path: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Closed set of edit operations. Keeping this an enum makes validation
/// exhaustive and checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOp {
    FullReplace,
    SearchReplace,
    InsertLines,
    DeleteLines,
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditOp::FullReplace => "full_replace",
            EditOp::SearchReplace => "search_replace",
            EditOp::InsertLines => "insert_lines",
            EditOp::DeleteLines => "delete_lines",
        };
        f.write_str(name)
    }
}

/// One requested change to one file. Executed once; terminal after
/// `apply_edits` flips `success` or records `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub path: String,
    pub op: EditOp,
    #[serde(default)]
    pub old_content: Option<String>,
    #[serde(default)]
    pub new_content: Option<String>,
    #[serde(default)]
    pub line_start: Option<usize>,
    #[serde(default)]
    pub line_end: Option<usize>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Edit {
    pub fn full_replace(path: impl Into<String>, new_content: impl Into<String>) -> Self {
        Edit {
            path: path.into(),
            op: EditOp::FullReplace,
            old_content: None,
            new_content: Some(new_content.into()),
            line_start: None,
            line_end: None,
            success: false,
            error: None,
        }
    }

    pub fn search_replace(
        path: impl Into<String>,
        old_content: impl Into<String>,
        new_content: impl Into<String>,
    ) -> Self {
        Edit {
            path: path.into(),
            op: EditOp::SearchReplace,
            old_content: Some(old_content.into()),
            new_content: Some(new_content.into()),
            line_start: None,
            line_end: None,
            success: false,
            error: None,
        }
    }

    pub fn insert_lines(
        path: impl Into<String>,
        line_start: usize,
        new_content: impl Into<String>,
    ) -> Self {
        Edit {
            path: path.into(),
            op: EditOp::InsertLines,
            old_content: None,
            new_content: Some(new_content.into()),
            line_start: Some(line_start),
            line_end: None,
            success: false,
            error: None,
        }
    }

    pub fn delete_lines(path: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        Edit {
            path: path.into(),
            op: EditOp::DeleteLines,
            old_content: None,
            new_content: None,
            line_start: Some(line_start),
            line_end: Some(line_end),
            success: false,
            error: None,
        }
    }
}

/// Result of one `apply_edits` call. `success` is true iff zero edits failed
/// across all files.
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    pub success: bool,
    pub applied: Vec<Edit>,
    pub failed: Vec<Edit>,
    pub backup_path: Option<PathBuf>,
    pub diff: Option<String>,
}

/// Detected project flavor, first manifest match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    React,
    Vue,
    NextJs,
    NodeExpress,
    JavaScript,
    Python,
    Ruby,
    Php,
    Go,
    Rust,
    StaticWeb,
    #[default]
    Unknown,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectType::React => "React",
            ProjectType::Vue => "Vue",
            ProjectType::NextJs => "Next.js",
            ProjectType::NodeExpress => "Node.js/Express",
            ProjectType::JavaScript => "JavaScript",
            ProjectType::Python => "Python",
            ProjectType::Ruby => "Ruby",
            ProjectType::Php => "PHP",
            ProjectType::Go => "Go",
            ProjectType::Rust => "Rust",
            ProjectType::StaticWeb => "HTML/CSS/JS",
            ProjectType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Flat dependency map: manager name -> package -> version spec (empty when
/// the manifest does not carry one).
pub type DependencyMap = BTreeMap<String, BTreeMap<String, String>>;

/// Per-extension rollup used by `Summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    pub count: usize,
    pub lines: usize,
}

/// Aggregate view of one catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub code_files: usize,
    pub total_lines: usize,
    pub total_size_mb: f64,
    pub project_type: ProjectType,
    pub by_extension: BTreeMap<String, ExtensionStats>,
    pub dependencies: DependencyMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_op_serde_names() {
        let op: EditOp = serde_json::from_str("\"search_replace\"").expect("parse op");
        assert_eq!(op, EditOp::SearchReplace);
        assert_eq!(serde_json::to_string(&EditOp::FullReplace).expect("ser"), "\"full_replace\"");
    }

    #[test]
    fn test_project_type_display() {
        assert_eq!(ProjectType::NextJs.to_string(), "Next.js");
        assert_eq!(ProjectType::StaticWeb.to_string(), "HTML/CSS/JS");
        assert_eq!(ProjectType::default(), ProjectType::Unknown);
    }

    #[test]
    fn test_file_record_round_trips_without_content() {
        let record = FileRecord {
            path: PathBuf::from("/repo/src/login.js"),
            relative_path: "src/login.js".to_string(),
            size_bytes: 1200,
            extension: ".js".to_string(),
            is_code: true,
            content: None,
            content_hash: None,
            line_count: 0,
        };
        let json = serde_json::to_string(&record).expect("ser");
        let back: FileRecord = serde_json::from_str(&json).expect("de");
        assert_eq!(back, record);
    }
}
