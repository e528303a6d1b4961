//! Versioned on-disk catalog cache.
//!
//! The version tag is a compatibility gate only: any mismatch (or any read or
//! parse failure) falls back to a full rescan. Save failures degrade to a
//! warning; the in-memory catalog stays authoritative.

use crate::domain::{DependencyMap, FileRecord, ProjectType, CACHE_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const CACHE_FILE_NAME: &str = ".repo-pilot-cache.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheFile {
    pub version: String,
    pub project_type: ProjectType,
    pub dependencies: DependencyMap,
    pub files: BTreeMap<String, FileRecord>,
}

pub fn load(path: &Path) -> Option<CacheFile> {
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!("failed to read cache {}: {err}", path.display());
            return None;
        }
    };

    let cache: CacheFile = match serde_json::from_str(&content) {
        Ok(cache) => cache,
        Err(err) => {
            warn!("failed to parse cache {}: {err}", path.display());
            return None;
        }
    };

    if cache.version != CACHE_VERSION {
        return None;
    }

    Some(cache)
}

pub fn save(path: &Path, cache: &CacheFile) {
    let serialized = match serde_json::to_string(cache) {
        Ok(serialized) => serialized,
        Err(err) => {
            warn!("failed to serialize cache: {err}");
            return;
        }
    };
    if let Err(err) = fs::write(path, serialized) {
        warn!("failed to save cache {}: {err}", path.display());
    }
}
