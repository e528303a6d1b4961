//! Task text tokenization and intent classification.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z_][\w-]*\b").expect("valid word regex"));

/// Filler words plus generic task verbs that would otherwise match everywhere.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do",
        "does", "did", "will", "would", "should", "could", "can", "may", "might", "must", "this",
        "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "create", "add",
        "update", "delete", "make", "build", "implement",
    ]
    .into_iter()
    .collect()
});

const EDIT_KEYWORDS: &[&str] = &["edit", "modify", "update", "change", "fix", "refactor"];
const CREATE_KEYWORDS: &[&str] = &["create", "add", "build", "implement", "new"];
const BUG_KEYWORDS: &[&str] = &["bug", "error", "fix"];
const STYLE_KEYWORDS: &[&str] = &["style", "css", "design", "ui", "layout"];

/// Classified task category driving scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Edit,
    Create,
    Bugfix,
    Style,
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Edit => "edit",
            Intent::Create => "create",
            Intent::Bugfix => "bugfix",
            Intent::Style => "style",
            Intent::General => "general",
        };
        f.write_str(name)
    }
}

/// Lowercased words minus stop words and short tokens, deduped preserving
/// first occurrence order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for m in WORD_RE.find_iter(&lowered) {
        let word = m.as_str();
        if word.len() <= 2 || STOP_WORDS.contains(word) {
            continue;
        }
        if seen.insert(word.to_string()) {
            keywords.push(word.to_string());
        }
    }

    keywords
}

/// First-match priority: edit, create, bugfix, style, general.
pub fn classify_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    if EDIT_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::Edit;
    }
    if CREATE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::Create;
    }
    if BUG_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::Bugfix;
    }
    if STYLE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Intent::Style;
    }
    Intent::General
}
