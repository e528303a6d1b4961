//! Repository indexer: walks a tree, catalogs file metadata (and content for
//! small code files), and persists the result to a versioned on-disk cache.

use crate::domain::{
    CoreError, FileRecord, ProjectType, Summary, ALLOWED_DOTFILES, BINARY_EXTENSIONS,
    CODE_EXTENSIONS, CONTENT_LOAD_CAP, IGNORE_DIRS, IGNORE_FILES,
};
use crate::utils::{content_hash, normalize_path, read_text_lossy};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod cache;
mod project;

pub use cache::CACHE_FILE_NAME;

/// One repository's catalog plus detected project metadata.
///
/// A `RepoIndex` owns the in-memory catalog for exactly one root path. Callers
/// must serialize workflow execution per repository; neither the cache file
/// nor the catalog is lock-protected.
#[derive(Debug)]
pub struct RepoIndex {
    root: PathBuf,
    cache_path: PathBuf,
    files: BTreeMap<String, FileRecord>,
    project_type: ProjectType,
    dependencies: crate::domain::DependencyMap,
    exclude: Option<GlobSet>,
}

impl RepoIndex {
    /// Open an index over `root`. A non-existent root is a fatal precondition
    /// error; everything later degrades gracefully.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            return Err(CoreError::MissingRoot(root).into());
        }
        let root = root.canonicalize()?;
        let cache_path = root.join(CACHE_FILE_NAME);
        Ok(RepoIndex {
            root,
            cache_path,
            files: BTreeMap::new(),
            project_type: ProjectType::Unknown,
            dependencies: BTreeMap::new(),
            exclude: None,
        })
    }

    /// Exclude catalog paths matching these globs (matched against the
    /// slash-normalized relative path). An excluded scan always walks the
    /// tree and never reads or writes the cache, which stays a catalog of
    /// the whole repository.
    pub fn set_exclude_globs(&mut self, patterns: &[String]) -> Result<()> {
        if patterns.is_empty() {
            self.exclude = None;
            return Ok(());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob =
                Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?;
            builder.add(glob);
        }
        self.exclude = Some(builder.build()?);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &BTreeMap<String, FileRecord> {
        &self.files
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    pub fn dependencies(&self) -> &crate::domain::DependencyMap {
        &self.dependencies
    }

    /// Build the catalog. With `force_refresh` false a version-matching cache
    /// short-circuits the filesystem walk entirely; otherwise the tree is
    /// walked, project type and dependencies are detected, and the cache is
    /// rewritten wholesale.
    pub fn scan(&mut self, force_refresh: bool) -> Result<&BTreeMap<String, FileRecord>> {
        if !force_refresh && self.exclude.is_none() {
            if let Some(cached) = cache::load(&self.cache_path) {
                debug!(files = cached.files.len(), "loaded catalog from cache");
                self.files = cached.files;
                self.project_type = cached.project_type;
                self.dependencies = cached.dependencies;
                return Ok(&self.files);
            }
        }

        self.files = BTreeMap::new();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .filter_entry(|entry| {
                // Prune ignored directories before descending into them.
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    return true;
                }
                match entry.file_name().to_str() {
                    Some(name) => !should_ignore_dir(name),
                    None => false,
                }
            })
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let filename = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            if should_ignore_file(filename) {
                continue;
            }

            let relative_path = match path.strip_prefix(&self.root) {
                Ok(rel) => normalize_path(&rel.to_string_lossy()),
                Err(_) => continue,
            };
            if self.exclude.as_ref().is_some_and(|set| set.is_match(&relative_path)) {
                continue;
            }

            match build_record(path, &relative_path) {
                Some(record) => {
                    self.files.insert(relative_path, record);
                }
                None => continue,
            }
        }

        debug!(files = self.files.len(), root = %self.root.display(), "indexed repository");

        self.project_type = self.detect_project_type();
        self.dependencies = self.parse_dependencies();

        if self.exclude.is_none() {
            cache::save(
                &self.cache_path,
                &cache::CacheFile {
                    version: crate::domain::CACHE_VERSION.to_string(),
                    project_type: self.project_type,
                    dependencies: self.dependencies.clone(),
                    files: self.files.clone(),
                },
            );
        }

        Ok(&self.files)
    }

    /// Content of one cataloged file. Cached content is returned directly;
    /// otherwise the file is loaded once from disk and cached. Returns `None`
    /// for unknown paths and files that no longer exist.
    pub fn get_content(&mut self, relative_path: &str) -> Option<String> {
        let record = self.files.get_mut(relative_path)?;
        if let Some(content) = &record.content {
            return Some(content.clone());
        }

        let full_path = self.root.join(relative_path);
        match read_text_lossy(&full_path) {
            Ok(content) => {
                record.content = Some(content.clone());
                Some(content)
            }
            Err(err) => {
                warn!("could not read {relative_path}: {err:#}");
                None
            }
        }
    }

    /// Case-insensitive substring search over catalog paths.
    pub fn find_files(&self, pattern: &str) -> Vec<&FileRecord> {
        let needle = pattern.to_lowercase();
        self.files
            .values()
            .filter(|record| record.relative_path.to_lowercase().contains(&needle))
            .collect()
    }

    /// Aggregate stats for the whole catalog.
    pub fn summary(&self) -> Summary {
        let mut by_extension: BTreeMap<String, crate::domain::ExtensionStats> = BTreeMap::new();
        let mut code_files = 0usize;
        let mut total_lines = 0usize;
        let mut total_size = 0u64;

        for record in self.files.values() {
            total_size += record.size_bytes;
            if record.is_code {
                code_files += 1;
                total_lines += record.line_count;
                let stats = by_extension.entry(record.extension.clone()).or_default();
                stats.count += 1;
                stats.lines += record.line_count;
            }
        }

        Summary {
            total_files: self.files.len(),
            code_files,
            total_lines,
            total_size_mb: (total_size as f64 / 1_000_000.0 * 100.0).round() / 100.0,
            project_type: self.project_type,
            by_extension,
            dependencies: self.dependencies.clone(),
        }
    }
}

fn should_ignore_dir(name: &str) -> bool {
    IGNORE_DIRS.contains(&name) || name.starts_with('.')
}

fn should_ignore_file(name: &str) -> bool {
    if IGNORE_FILES.contains(&name) {
        return true;
    }
    if name.starts_with('.') && !ALLOWED_DOTFILES.contains(&name) {
        return true;
    }
    let ext = extension_of(name);
    BINARY_EXTENSIONS.contains(&ext.as_str())
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Stat one file and capture content eagerly when it is code under the load
/// cap. Unreadable files are skipped with a warning, never aborting the scan.
fn build_record(path: &Path, relative_path: &str) -> Option<FileRecord> {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(err) => {
            warn!("error processing {relative_path}: {err}");
            return None;
        }
    };

    let size_bytes = metadata.len();
    let extension = extension_of(relative_path);
    let is_code = CODE_EXTENSIONS.contains(&extension.as_str());

    let mut content = None;
    let mut hash = None;
    let mut line_count = 0usize;

    if is_code && size_bytes < CONTENT_LOAD_CAP {
        match read_text_lossy(path) {
            Ok(text) => {
                line_count = text.matches('\n').count() + 1;
                hash = Some(content_hash(&text));
                content = Some(text);
            }
            Err(err) => {
                warn!("could not read {relative_path}: {err:#}");
            }
        }
    }

    Some(FileRecord {
        path: path.to_path_buf(),
        relative_path: relative_path.to_string(),
        size_bytes,
        extension,
        is_code,
        content,
        content_hash: hash,
        line_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn seed_repo(root: &Path) {
        fs::create_dir_all(root.join("src")).expect("mkdir src");
        fs::write(root.join("src/login.js"), "function login() {}\n".repeat(5)).expect("write");
        fs::write(root.join("src/about.js"), "// about page\n").expect("write");
        fs::write(root.join("logo.png"), [0x89, 0x50, 0x4e, 0x47]).expect("write");
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let err = RepoIndex::open(tmp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_scan_catalogs_code_and_skips_binaries() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        assert!(index.files().contains_key("src/login.js"));
        assert!(index.files().contains_key("src/about.js"));
        assert!(!index.files().contains_key("logo.png"));

        let login = &index.files()["src/login.js"];
        assert!(login.is_code);
        assert!(login.content.is_some());
        assert!(login.content_hash.is_some());
        assert_eq!(login.line_count, 6);
    }

    #[test]
    fn test_scan_never_descends_into_ignored_dirs() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());
        fs::create_dir_all(tmp.path().join("node_modules/react")).expect("mkdir");
        fs::write(tmp.path().join("node_modules/react/index.js"), "x").expect("write");
        fs::create_dir_all(tmp.path().join(".cache")).expect("mkdir");
        fs::write(tmp.path().join(".cache/data.js"), "x").expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        assert!(index.files().keys().all(|p| !p.starts_with("node_modules")));
        assert!(index.files().keys().all(|p| !p.starts_with(".cache")));
    }

    #[test]
    fn test_ignored_and_hidden_files_skipped_with_allowlist() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("package-lock.json"), "{}").expect("write");
        fs::write(tmp.path().join(".env"), "SECRET=1").expect("write");
        fs::write(tmp.path().join(".gitignore"), "target/\n").expect("write");
        fs::write(tmp.path().join("app.js"), "let a = 1;\n").expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        assert!(!index.files().contains_key("package-lock.json"));
        assert!(!index.files().contains_key(".env"));
        assert!(index.files().contains_key(".gitignore"));
        assert!(index.files().contains_key("app.js"));
    }

    #[test]
    fn test_large_code_files_load_lazily() {
        let tmp = TempDir::new().expect("tmp");
        let big = "// filler line\n".repeat(40_000); // ~600 KB
        fs::write(tmp.path().join("big.js"), &big).expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        let record = &index.files()["big.js"];
        assert!(record.is_code);
        assert!(record.content.is_none());
        assert!(record.content_hash.is_none());

        let loaded = index.get_content("big.js").expect("content");
        assert_eq!(loaded, big);
        // Cached after the first load
        assert!(index.files()["big.js"].content.is_some());
    }

    #[test]
    fn test_get_content_absent_for_deleted_file() {
        let tmp = TempDir::new().expect("tmp");
        let big = "x\n".repeat(300_000);
        fs::write(tmp.path().join("gone.txt"), &big).expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");
        fs::remove_file(tmp.path().join("gone.txt")).expect("rm");

        assert!(index.get_content("gone.txt").is_none());
        assert!(index.get_content("never-indexed.txt").is_none());
    }

    #[test]
    fn test_second_scan_uses_cache_and_skips_walk() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");
        let first = index.files().clone();

        // A file added after the first scan is invisible to the cache
        // fast-path, proving no walk happened.
        fs::write(tmp.path().join("src/new.js"), "// new\n").expect("write");

        let mut fresh = RepoIndex::open(tmp.path()).expect("open");
        fresh.scan(false).expect("scan");
        assert_eq!(fresh.files(), &first);
        assert!(!fresh.files().contains_key("src/new.js"));

        // Forced refresh walks again and sees it.
        fresh.scan(true).expect("rescan");
        assert!(fresh.files().contains_key("src/new.js"));
    }

    #[test]
    fn test_cache_round_trip_preserves_catalog() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());
        fs::write(tmp.path().join("requirements.txt"), "flask==2.0\n").expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        let mut reloaded = RepoIndex::open(tmp.path()).expect("open");
        reloaded.scan(false).expect("scan");

        assert_eq!(reloaded.files(), index.files());
        assert_eq!(reloaded.project_type(), index.project_type());
        assert_eq!(reloaded.dependencies(), index.dependencies());
    }

    #[test]
    fn test_exclude_globs_filter_catalog_and_bypass_cache() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.set_exclude_globs(&["src/about.*".to_string()]).expect("globs");
        index.scan(true).expect("scan");

        assert!(index.files().contains_key("src/login.js"));
        assert!(!index.files().contains_key("src/about.js"));
        // An excluded scan never persists its narrowed catalog
        assert!(!tmp.path().join(CACHE_FILE_NAME).exists());

        // And never reuses a full cache either
        let mut full = RepoIndex::open(tmp.path()).expect("open");
        full.scan(true).expect("scan");
        let mut narrowed = RepoIndex::open(tmp.path()).expect("open");
        narrowed.set_exclude_globs(&["*.js".to_string()]).expect("globs");
        narrowed.scan(false).expect("scan");
        assert!(narrowed.files().is_empty());
    }

    #[test]
    fn test_invalid_exclude_glob_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let mut index = RepoIndex::open(tmp.path()).expect("open");
        let err = index.set_exclude_globs(&["[".to_string()]).expect_err("bad glob");
        assert!(err.to_string().contains("invalid exclude glob"));
    }

    #[test]
    fn test_find_files_matches_substring_case_insensitive() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        let hits = index.find_files("LOGIN");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].relative_path, "src/login.js");
    }

    #[test]
    fn test_summary_counts_and_breakdown() {
        let tmp = TempDir::new().expect("tmp");
        seed_repo(tmp.path());

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");
        let summary = index.summary();

        assert_eq!(summary.code_files, 2);
        assert_eq!(summary.by_extension[".js"].count, 2);
        assert!(summary.total_files >= 2);
        assert!(summary.total_lines >= 7);
    }
}
