//! Per-file relevance scoring.
//!
//! Each factor is independent, additive, and contributes at most one reason
//! string. Only eagerly cached content participates in content matching;
//! metadata-only files score on name, extension, and size alone.

use super::keywords::Intent;
use crate::domain::{FileRecord, SMALL_FILE_BYTES};
use crate::utils::paths::parent_dir;
use std::collections::HashSet;

/// Fixed factor weights.
#[derive(Debug, Clone)]
pub struct Weights {
    pub filename_exact: f64,
    pub filename_partial: f64,
    pub content_high: f64,
    pub content_medium: f64,
    pub content_low: f64,
    pub extension_match: f64,
    pub path_similarity: f64,
    pub small_file_bonus: f64,
    pub important_file: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            filename_exact: 10.0,
            filename_partial: 5.0,
            content_high: 8.0,
            content_medium: 4.0,
            content_low: 1.0,
            extension_match: 3.0,
            path_similarity: 2.0,
            small_file_bonus: 1.0,
            important_file: 2.0,
        }
    }
}

const IMPORTANT_NAME_PATTERNS: &[&str] = &[
    "config",
    "package.json",
    "tsconfig",
    "webpack",
    "vite",
    "next.config",
    "tailwind.config",
    "utils",
    "helpers",
    "constants",
    "types",
];

/// Score one file against the task. Returns the additive score and the
/// human-readable reasons, in factor order.
pub fn score_file(
    record: &FileRecord,
    keywords: &[String],
    intent: Intent,
    targets: &[String],
    weights: &Weights,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    let filename = record.relative_path.to_lowercase();
    let content_lower = record.content.as_deref().map(str::to_lowercase);

    // Explicit target mention, first match only
    for target in targets {
        if filename.contains(&target.to_lowercase()) {
            score += weights.filename_exact;
            reasons.push("mentioned in task".to_string());
            break;
        }
    }

    // Keyword in the filename, first match only
    for keyword in keywords {
        if filename.contains(keyword.as_str()) {
            score += weights.filename_partial;
            reasons.push(format!("filename contains '{keyword}'"));
            break;
        }
    }

    // Keyword occurrences in cached content, bucketed
    if let Some(content) = &content_lower {
        let density: usize =
            keywords.iter().map(|keyword| content.matches(keyword.as_str()).count()).sum();
        if density > 10 {
            score += weights.content_high;
            reasons.push("high keyword density".to_string());
        } else if density > 3 {
            score += weights.content_medium;
            reasons.push("contains keywords".to_string());
        } else if density > 0 {
            score += weights.content_low;
        }
    }

    // Extension relevant to the task
    if relevant_extensions(intent, keywords).contains(record.extension.as_str()) {
        score += weights.extension_match;
        reasons.push("relevant file type".to_string());
    }

    // Same parent directory as an explicit target, edit intent only
    if intent == Intent::Edit {
        let file_dir = parent_dir(&filename).to_string();
        for target in targets {
            if parent_dir(&target.to_lowercase()) == file_dir {
                score += weights.path_similarity;
                reasons.push("same directory".to_string());
                break;
            }
        }
    }

    // Small files are cheap to include
    if record.size_bytes < SMALL_FILE_BYTES {
        score += weights.small_file_bonus;
    }

    // Known config/utility names
    if IMPORTANT_NAME_PATTERNS.iter().any(|pattern| filename.contains(pattern)) {
        score += weights.important_file;
        reasons.push("important config/utility".to_string());
    }

    (score, reasons)
}

/// Extensions relevant to the task: keyword-group matches unioned with
/// intent defaults, with a web-trio fallback when nothing matched.
fn relevant_extensions(intent: Intent, keywords: &[String]) -> HashSet<&'static str> {
    let mut extensions: HashSet<&'static str> = HashSet::new();
    let has = |words: &[&str]| keywords.iter().any(|kw| words.contains(&kw.as_str()));

    if has(&["html", "page", "template"]) {
        extensions.extend([".html", ".css", ".js"]);
    }
    if has(&["style", "css", "design"]) {
        extensions.extend([".css", ".scss", ".sass", ".less"]);
    }
    if has(&["script", "javascript", "function"]) {
        extensions.extend([".js", ".jsx", ".ts", ".tsx"]);
    }
    if has(&["component", "react", "vue"]) {
        extensions.extend([".jsx", ".tsx", ".vue"]);
    }

    match intent {
        Intent::Style => extensions.extend([".css", ".scss", ".sass", ".html"]),
        Intent::Create => extensions.extend([".html", ".css", ".js", ".jsx", ".ts", ".tsx"]),
        _ => {}
    }

    if extensions.is_empty() {
        extensions.extend([".html", ".css", ".js"]);
    }
    extensions
}
