//! Configuration loading and merging with CLI flag precedence
//! (CLI > file > defaults).

pub mod loader;

pub use loader::load_config;

use serde::{Deserialize, Serialize};

/// Tunable limits, loadable from a `repo-pilot.toml`/`.yml` file at the
/// repository root. Every field has a default so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Maximum files admitted into one context bundle.
    pub max_files: usize,
    /// Approximate token budget for one context bundle.
    pub max_tokens: u64,
    /// Whether edits back up existing files before mutating them.
    pub create_backups: bool,
    /// Backups retained per original file when pruning.
    pub keep_backups: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { max_files: 10, max_tokens: 8_000, create_backups: true, keep_backups: 5 }
    }
}

/// CLI-level overrides applied on top of the loaded file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_files: Option<usize>,
    pub max_tokens: Option<u64>,
    pub no_backup: bool,
}

pub fn merge_cli_with_config(config: Config, overrides: &CliOverrides) -> Config {
    Config {
        max_files: overrides.max_files.unwrap_or(config.max_files),
        max_tokens: overrides.max_tokens.unwrap_or(config.max_tokens),
        create_backups: config.create_backups && !overrides.no_backup,
        keep_backups: config.keep_backups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_take_precedence() {
        let config = Config { max_files: 20, max_tokens: 4_000, ..Config::default() };
        let overrides =
            CliOverrides { max_files: Some(3), max_tokens: None, no_backup: true };

        let merged = merge_cli_with_config(config, &overrides);
        assert_eq!(merged.max_files, 3);
        assert_eq!(merged.max_tokens, 4_000);
        assert!(!merged.create_backups);
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let config = Config { keep_backups: 2, ..Config::default() };
        let merged = merge_cli_with_config(config.clone(), &CliOverrides::default());
        assert_eq!(merged, config);
    }
}
