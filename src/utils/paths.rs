//! Path normalization

/// Convert backslashes to forward slashes so catalog keys are stable across
/// platforms.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Parent directory of a normalized relative path, empty string for top-level
/// entries.
pub fn parent_dir(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_flips_backslashes() {
        assert_eq!(normalize_path("src\\app\\main.js"), "src/app/main.js");
        assert_eq!(normalize_path("src/main.js"), "src/main.js");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("src/app/main.js"), "src/app");
        assert_eq!(parent_dir("main.js"), "");
    }
}
