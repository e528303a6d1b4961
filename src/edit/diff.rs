//! Human-readable change summaries for applied edits.

use crate::domain::{Edit, EditOp};
use similar::TextDiff;

const SNIPPET_CHARS: usize = 100;

/// Unified diff between two versions of one file.
pub fn unified_diff(old: &str, new: &str, path: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

/// Summary block describing every applied edit. Full replacements with known
/// prior content get a unified diff; other operations get truncated snippets.
pub fn summary(applied: &[Edit]) -> String {
    let mut parts = Vec::new();
    parts.push("=".repeat(60));
    parts.push("CHANGES SUMMARY".to_string());
    parts.push("=".repeat(60));

    for edit in applied {
        parts.push(format!("File: {}", edit.path));
        parts.push(format!("Operation: {}", edit.op));
        match edit.op {
            EditOp::FullReplace => match (&edit.old_content, &edit.new_content) {
                (Some(old), Some(new)) => parts.push(unified_diff(old, new, &edit.path)),
                (None, Some(new)) => {
                    parts.push(format!("New file ({} lines)", new.split('\n').count()));
                }
                _ => {}
            },
            EditOp::SearchReplace => {
                if let Some(old) = &edit.old_content {
                    parts.push(format!("- {}", snippet(old)));
                }
                if let Some(new) = &edit.new_content {
                    parts.push(format!("+ {}", snippet(new)));
                }
            }
            EditOp::InsertLines => {
                if let (Some(line), Some(new)) = (edit.line_start, &edit.new_content) {
                    parts.push(format!("+ line {line}: {}", snippet(new)));
                }
            }
            EditOp::DeleteLines => {
                if let (Some(start), Some(end)) = (edit.line_start, edit.line_end) {
                    parts.push(format!("- lines {start}..{end}"));
                }
            }
        }
        parts.push("-".repeat(60));
    }

    parts.join("\n")
}

fn snippet(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= SNIPPET_CHARS {
        flat
    } else {
        let truncated: String = flat.chars().take(SNIPPET_CHARS).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Edit;

    #[test]
    fn test_unified_diff_marks_changed_lines() {
        let diff = unified_diff("a\nb\nc\n", "a\nx\nc\n", "src/app.js");
        assert!(diff.contains("a/src/app.js"));
        assert!(diff.contains("-b"));
        assert!(diff.contains("+x"));
    }

    #[test]
    fn test_summary_full_replace_with_prior_content() {
        let mut edit = Edit::full_replace("app.js", "let a = 2;\n");
        edit.old_content = Some("let a = 1;\n".to_string());

        let text = summary(&[edit]);
        assert!(text.contains("CHANGES SUMMARY"));
        assert!(text.contains("File: app.js"));
        assert!(text.contains("Operation: full_replace"));
        assert!(text.contains("-let a = 1;"));
        assert!(text.contains("+let a = 2;"));
    }

    #[test]
    fn test_summary_truncates_long_search_replace_snippets() {
        let old = "x".repeat(300);
        let edit = Edit::search_replace("app.js", old, "short");
        let text = summary(&[edit]);
        assert!(text.contains(&format!("- {}...", "x".repeat(100))));
        assert!(text.contains("+ short"));
    }

    #[test]
    fn test_summary_new_file_without_prior_content() {
        let edit = Edit::full_replace("fresh.html", "<p>a</p>\n<p>b</p>");
        let text = summary(&[edit]);
        assert!(text.contains("New file (2 lines)"));
    }
}
