//! Context bundle formatting: the structured text handed to the generation
//! service, plus the short human-facing selection summary.

use crate::domain::RelevanceResult;
use crate::index::RepoIndex;
use crate::utils::paths::parent_dir;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

const TREE_MAX_DEPTH: usize = 3;
const TREE_MAX_DIRS: usize = 12;
const TREE_MAX_FILES_PER_DIR: usize = 6;
const MAX_IMPORTS: usize = 10;
const MAX_REASONS_SHOWN: usize = 2;

/// Short listing of the selection for progress reporting.
pub fn context_summary(index: &RepoIndex, selected: &[RelevanceResult]) -> String {
    let mut parts = vec![format!("Repository Context ({} files):", selected.len())];

    for (i, result) in selected.iter().enumerate() {
        let (lines, extension) = index
            .files()
            .get(&result.relative_path)
            .map(|record| (record.line_count, record.extension.clone()))
            .unwrap_or_default();
        parts.push(format!(
            "{}. {} ({} lines, {}) [score {:.1}]",
            i + 1,
            result.relative_path,
            lines,
            extension,
            result.score
        ));
        if !result.reasons.is_empty() {
            let shown: Vec<&str> = result
                .reasons
                .iter()
                .take(MAX_REASONS_SHOWN)
                .map(String::as_str)
                .collect();
            parts.push(format!("   Reasons: {}", shown.join(", ")));
        }
    }

    parts.join("\n")
}

/// The full context bundle: project overview, structure, dependencies, and
/// each selected file's content between explicit begin/end markers.
pub fn format_context(index: &mut RepoIndex, selected: &[RelevanceResult]) -> String {
    let summary = index.summary();
    let mut parts = Vec::new();

    parts.push("=== REPOSITORY CONTEXT ===".to_string());
    parts.push(format!("Project Type: {}", summary.project_type));
    parts.push(format!(
        "Files: {} total, {} code, {} lines, {} MB",
        summary.total_files, summary.code_files, summary.total_lines, summary.total_size_mb
    ));

    parts.push(String::new());
    parts.push("Structure:".to_string());
    parts.push(tree_overview(index));

    if !summary.dependencies.is_empty() {
        parts.push(String::new());
        parts.push("Dependencies:".to_string());
        for (manager, packages) in &summary.dependencies {
            let mut names: Vec<&str> = packages.keys().take(8).map(String::as_str).collect();
            if packages.len() > names.len() {
                names.push("...");
            }
            parts.push(format!("{} ({}): {}", manager, packages.len(), names.join(", ")));
        }
    }

    parts.push(String::new());
    parts.push(format!("=== RELEVANT FILES ({}) ===", selected.len()));

    for result in selected {
        let Some(content) = index.get_content(&result.relative_path) else {
            continue;
        };
        let (lines, extension) = index
            .files()
            .get(&result.relative_path)
            .map(|record| (record.line_count, record.extension.clone()))
            .unwrap_or_default();

        parts.push(String::new());
        parts.push(format!("--- FILE: {} ---", result.relative_path));
        parts.push(format!("Lines: {} | Extension: {}", lines, extension));
        let shown: Vec<&str> =
            result.reasons.iter().take(MAX_REASONS_SHOWN).map(String::as_str).collect();
        parts.push(format!("Relevance: {}", shown.join(", ")));
        let imports = detect_imports(&content, &extension);
        if !imports.is_empty() {
            parts.push(format!("Imports: {}", imports.join(", ")));
        }
        parts.push(String::new());
        parts.push(content);
        parts.push(format!("--- END FILE: {} ---", result.relative_path));
    }

    parts.join("\n")
}

/// Depth-limited directory overview built from the catalog, with caps on
/// directories shown and files per directory.
fn tree_overview(index: &RepoIndex) -> String {
    let mut by_dir: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for relative_path in index.files().keys() {
        let dir = parent_dir(relative_path);
        if dir.matches('/').count() + usize::from(!dir.is_empty()) > TREE_MAX_DEPTH {
            continue;
        }
        let filename = relative_path.rsplit('/').next().unwrap_or(relative_path);
        by_dir.entry(dir.to_string()).or_default().push(filename);
    }

    let total_dirs = by_dir.len();
    let mut lines = Vec::new();
    for (dir, files) in by_dir.into_iter().take(TREE_MAX_DIRS) {
        if dir.is_empty() {
            lines.push("./".to_string());
        } else {
            lines.push(format!("{dir}/"));
        }
        for file in files.iter().take(TREE_MAX_FILES_PER_DIR) {
            lines.push(format!("  {file}"));
        }
        if files.len() > TREE_MAX_FILES_PER_DIR {
            lines.push(format!("  ... and {} more", files.len() - TREE_MAX_FILES_PER_DIR));
        }
    }
    if total_dirs > TREE_MAX_DIRS {
        lines.push(format!("... and {} more directories", total_dirs - TREE_MAX_DIRS));
    }

    lines.join("\n")
}

static JS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)(?:import\s+(?:[\w{},*\s]+\s+from\s+)?|require\(\s*)['"]([^'"]+)['"]"#)
        .expect("valid js import regex")
});
static PY_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:from\s+([\w.]+)\s+import|import\s+([\w.]+))")
        .expect("valid py import regex")
});
static RS_USE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:pub\s+)?use\s+([\w:]+)").expect("valid rs use regex"));
static GO_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import\s+)?"([^"]+)"\s*$|import\s+"([^"]+)""#)
        .expect("valid go import regex")
});
static C_INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"#include\s+[<"]([^>"]+)[>"]"#).expect("valid include regex"));

/// Lightweight pattern-based import extraction, capped at 10 entries.
/// External URLs and trivial path fragments are excluded.
pub fn detect_imports(content: &str, extension: &str) -> Vec<String> {
    let captures: Vec<String> = match extension {
        ".js" | ".jsx" | ".ts" | ".tsx" | ".vue" | ".svelte" => JS_IMPORT_RE
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        ".py" => PY_IMPORT_RE
            .captures_iter(content)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect(),
        ".rs" => RS_USE_RE
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        ".go" => GO_IMPORT_RE
            .captures_iter(content)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .collect(),
        ".c" | ".cpp" | ".h" => C_INCLUDE_RE
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        _ => Vec::new(),
    };

    let mut imports = Vec::new();
    for import in captures {
        if import.starts_with("http://") || import.starts_with("https://") {
            continue;
        }
        if import.trim_matches(['.', '/']).len() < 2 {
            continue;
        }
        if !imports.contains(&import) {
            imports.push(import);
        }
        if imports.len() >= MAX_IMPORTS {
            break;
        }
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::{select_context, SelectOptions};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_imports_js() {
        let content = r#"
import React from 'react';
import { useState } from "react";
import './styles.css';
const api = require('./api/client');
fetch('https://example.com/data.json');
"#;
        let imports = detect_imports(content, ".js");
        assert_eq!(imports, vec!["react", "./styles.css", "./api/client"]);
    }

    #[test]
    fn test_detect_imports_python_and_rust() {
        let py = "import os\nfrom flask import Flask\nimport json\n";
        assert_eq!(detect_imports(py, ".py"), vec!["os", "flask", "json"]);

        let rs = "use std::fs;\npub use crate::domain::Edit;\n";
        assert_eq!(detect_imports(rs, ".rs"), vec!["std::fs", "crate::domain::Edit"]);
    }

    #[test]
    fn test_detect_imports_caps_at_ten() {
        let content: String =
            (0..20).map(|i| format!("import mod{i}\n")).collect();
        assert_eq!(detect_imports(&content, ".py").len(), 10);
    }

    #[test]
    fn test_format_context_has_markers_and_overview() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
        fs::write(tmp.path().join("src/login.js"), "import api from './api';\nlogin();\n")
            .expect("write");
        fs::write(tmp.path().join("package.json"), r#"{"dependencies":{"react":"18"}}"#)
            .expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");
        let selected = select_context(
            &index,
            "fix the login flow",
            &["login.js".to_string()],
            &SelectOptions::default(),
        );

        let bundle = format_context(&mut index, &selected);
        assert!(bundle.starts_with("=== REPOSITORY CONTEXT ==="));
        assert!(bundle.contains("Project Type: React"));
        assert!(bundle.contains("Structure:"));
        assert!(bundle.contains("npm (1): react"));
        assert!(bundle.contains("--- FILE: src/login.js ---"));
        assert!(bundle.contains("--- END FILE: src/login.js ---"));
        assert!(bundle.contains("Imports: ./api"));
        assert!(bundle.contains("login();"));
    }

    #[test]
    fn test_tree_overview_elides_long_directories() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
        for i in 0..10 {
            fs::write(tmp.path().join(format!("src/file{i:02}.js")), "x\n").expect("write");
        }

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");

        let overview = tree_overview(&index);
        assert!(overview.contains("src/"));
        assert!(overview.contains("file00.js"));
        assert!(overview.contains("... and 4 more"));
    }

    #[test]
    fn test_context_summary_lists_reasons() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("login.js"), "function login() {}\n").expect("write");

        let mut index = RepoIndex::open(tmp.path()).expect("open");
        index.scan(true).expect("scan");
        let selected = select_context(
            &index,
            "fix the login page",
            &["login.js".to_string()],
            &SelectOptions::default(),
        );

        let summary = context_summary(&index, &selected);
        assert!(summary.contains("Repository Context (1 files):"));
        assert!(summary.contains("1. login.js"));
        assert!(summary.contains("Reasons: mentioned in task"));
    }
}
