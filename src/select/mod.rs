//! Context selector: ranks catalog files against a task description and
//! bounds the selection by file count and an approximate token budget.

use crate::domain::RelevanceResult;
use crate::index::RepoIndex;
use crate::utils::estimate_tokens;
use tracing::debug;

pub mod format;
pub mod keywords;
pub mod score;

pub use format::{context_summary, detect_imports, format_context};
pub use keywords::{classify_intent, extract_keywords, Intent};
pub use score::{score_file, Weights};

/// Selection limits. Defaults mirror a context window comfortably below what
/// small local models handle.
#[derive(Debug, Clone)]
pub struct SelectOptions {
    pub max_files: usize,
    pub max_tokens: u64,
}

impl Default for SelectOptions {
    fn default() -> Self {
        SelectOptions { max_files: 10, max_tokens: 8_000 }
    }
}

/// Score every code file in the catalog and return the ranked prefix that
/// fits the budget. Zero qualifying files is a valid empty result.
pub fn select_context(
    index: &RepoIndex,
    task: &str,
    targets: &[String],
    options: &SelectOptions,
) -> Vec<RelevanceResult> {
    let keywords = extract_keywords(task);
    let intent = classify_intent(task);
    debug!(?intent, keywords = keywords.len(), "selecting context");

    let weights = Weights::default();
    let mut scored: Vec<RelevanceResult> = Vec::new();
    for record in index.files().values() {
        if !record.is_code {
            continue;
        }
        let (score, reasons) = score_file(record, &keywords, intent, targets, &weights);
        if score > 0.0 {
            scored.push(RelevanceResult {
                relative_path: record.relative_path.clone(),
                score,
                reasons,
            });
        }
    }

    // Stable sort keeps catalog iteration order on ties.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    select_within_budget(index, scored, options)
}

/// Take the scored prefix bounded by `max_files` and the running token
/// estimate. The single highest-scoring file is always admitted so a
/// non-empty scored result never collapses to zero.
fn select_within_budget(
    index: &RepoIndex,
    scored: Vec<RelevanceResult>,
    options: &SelectOptions,
) -> Vec<RelevanceResult> {
    let mut selected = Vec::new();
    let mut total_tokens = 0u64;

    for result in scored {
        if selected.len() >= options.max_files {
            break;
        }
        let size_bytes = index
            .files()
            .get(&result.relative_path)
            .map(|record| record.size_bytes)
            .unwrap_or(0);
        let file_tokens = estimate_tokens(size_bytes);

        if total_tokens + file_tokens > options.max_tokens {
            if selected.is_empty() {
                selected.push(result);
            }
            break;
        }

        selected.push(result);
        total_tokens += file_tokens;
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn indexed(root: &Path) -> RepoIndex {
        let mut index = RepoIndex::open(root).expect("open");
        index.scan(true).expect("scan");
        index
    }

    #[test]
    fn test_login_bugfix_scenario_ranks_target_first() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("src")).expect("mkdir");
        fs::write(tmp.path().join("src/login.js"), "function login() {}\n".repeat(50))
            .expect("write");
        fs::write(tmp.path().join("src/about.js"), "// about\n".repeat(10)).expect("write");

        let index = indexed(tmp.path());
        let targets = vec!["login.js".to_string()];
        let selected = select_context(
            &index,
            "fix the login bug",
            &targets,
            &SelectOptions::default(),
        );

        assert!(!selected.is_empty());
        assert_eq!(selected[0].relative_path, "src/login.js");
        let login_score = selected[0].score;
        let about_score = selected
            .iter()
            .find(|r| r.relative_path == "src/about.js")
            .map(|r| r.score)
            .unwrap_or(0.0);
        assert!(login_score > about_score);
    }

    #[test]
    fn test_explicit_target_strictly_increases_score() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("login.js"), "function login() {}\n").expect("write");

        let index = indexed(tmp.path());
        let without = select_context(&index, "fix the login bug", &[], &SelectOptions::default());
        let with = select_context(
            &index,
            "fix the login bug",
            &["login.js".to_string()],
            &SelectOptions::default(),
        );

        let base = without.iter().find(|r| r.relative_path == "login.js").expect("scored");
        let boosted = with.iter().find(|r| r.relative_path == "login.js").expect("scored");
        assert!(boosted.score > base.score);
    }

    #[test]
    fn test_max_files_and_token_budget_respected() {
        let tmp = TempDir::new().expect("tmp");
        for i in 0..8 {
            fs::write(
                tmp.path().join(format!("page{i}.js")),
                "// page content line\n".repeat(100),
            )
            .expect("write");
        }

        let index = indexed(tmp.path());
        let options = SelectOptions { max_files: 3, max_tokens: 100_000 };
        let selected = select_context(&index, "update the page script", &[], &options);
        assert!(selected.len() <= 3);

        // Tight token budget: entries after the first must fit the budget.
        let options = SelectOptions { max_files: 10, max_tokens: 600 };
        let selected = select_context(&index, "update the page script", &[], &options);
        let tail_tokens: u64 = selected
            .iter()
            .skip(1)
            .map(|r| index.files()[&r.relative_path].size_bytes / 4)
            .sum();
        assert!(tail_tokens <= 600);
    }

    #[test]
    fn test_oversized_top_file_still_selected() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("huge.js"), "// login handling\n".repeat(5_000))
            .expect("write");

        let index = indexed(tmp.path());
        let options = SelectOptions { max_files: 5, max_tokens: 10 };
        let selected = select_context(
            &index,
            "fix the login bug",
            &["huge.js".to_string()],
            &options,
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].relative_path, "huge.js");
    }

    #[test]
    fn test_no_qualifying_files_is_empty_not_error() {
        let tmp = TempDir::new().expect("tmp");
        // Large enough to miss the small-file bonus; shares nothing with the
        // task text and sits outside the default extension set.
        fs::write(tmp.path().join("pipeline.py"), "print('step')\n".repeat(1_000))
            .expect("write");

        let index = indexed(tmp.path());
        let selected = select_context(&index, "zzqq", &[], &SelectOptions::default());
        assert!(selected.is_empty());
    }
}
