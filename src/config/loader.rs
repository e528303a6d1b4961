//! Config file discovery and parsing.
//!
//! An explicitly provided path fails hard on any problem. An auto-discovered
//! file soft-fails: parse errors are logged and the defaults are used.

use super::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn load_config(repo_root: &Path, config_path: Option<&Path>) -> Result<Config> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(repo_root),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(config) => Ok(config),
        Err(err) if config_path_provided => Err(err),
        Err(err) => {
            warn!("ignoring auto-discovered config {}: {err:#}", config_file.display());
            Ok(Config::default())
        }
    }
}

/// Supports both a flat file and a nested `[repo-pilot]` section so the file
/// can live inside a larger tool config.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get("repo-pilot") {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val
        .try_into()
        .with_context(|| format!("invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get("repo-pilot") {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("invalid YAML config: {}", config_file.display()))
}

fn discover_config(repo_root: &Path) -> Option<PathBuf> {
    let candidates = [
        "repo-pilot.toml",
        ".repo-pilot.toml",
        "repo-pilot.yml",
        ".repo-pilot.yml",
        "repo-pilot.yaml",
        ".repo-pilot.yaml",
    ];

    candidates.into_iter().map(|candidate| repo_root.join(candidate)).find(|path| path.exists())
}
