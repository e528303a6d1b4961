//! Project type detection and flat dependency manifest parsing.

use super::RepoIndex;
use crate::domain::{DependencyMap, ProjectType};
use std::collections::BTreeMap;
use tracing::warn;

/// Manifest checks in priority order; the first match wins.
impl RepoIndex {
    pub(super) fn detect_project_type(&mut self) -> ProjectType {
        if self.files.contains_key("package.json") {
            return match self.get_content("package.json") {
                Some(content) => classify_node_project(&content),
                None => ProjectType::JavaScript,
            };
        }
        if self.files.contains_key("requirements.txt") || self.files.contains_key("pyproject.toml")
        {
            return ProjectType::Python;
        }
        if self.files.contains_key("Gemfile") {
            return ProjectType::Ruby;
        }
        if self.files.contains_key("composer.json") {
            return ProjectType::Php;
        }
        if self.files.contains_key("go.mod") {
            return ProjectType::Go;
        }
        if self.files.contains_key("Cargo.toml") {
            return ProjectType::Rust;
        }
        if self.files.values().any(|record| record.extension == ".html") {
            return ProjectType::StaticWeb;
        }
        ProjectType::Unknown
    }

    pub(super) fn parse_dependencies(&mut self) -> DependencyMap {
        let mut dependencies = DependencyMap::new();

        if self.files.contains_key("package.json") {
            if let Some(content) = self.get_content("package.json") {
                match merged_node_deps(&content) {
                    Some(deps) => {
                        dependencies.insert("npm".to_string(), deps);
                    }
                    None => warn!("failed to parse package.json dependencies"),
                }
            }
        }

        if self.files.contains_key("requirements.txt") {
            if let Some(content) = self.get_content("requirements.txt") {
                dependencies.insert("pip".to_string(), pip_dependencies(&content));
            }
        }

        if self.files.contains_key("Cargo.toml") {
            if let Some(content) = self.get_content("Cargo.toml") {
                match cargo_dependencies(&content) {
                    Some(deps) => {
                        dependencies.insert("cargo".to_string(), deps);
                    }
                    None => warn!("failed to parse Cargo.toml dependencies"),
                }
            }
        }

        dependencies
    }
}

fn merged_node_deps(content: &str) -> Option<BTreeMap<String, String>> {
    let manifest: serde_json::Value = serde_json::from_str(content).ok()?;
    let mut merged = BTreeMap::new();
    for section in ["dependencies", "devDependencies"] {
        if let Some(deps) = manifest.get(section).and_then(|v| v.as_object()) {
            for (name, version) in deps {
                merged.insert(
                    name.clone(),
                    version.as_str().unwrap_or_default().to_string(),
                );
            }
        }
    }
    Some(merged)
}

fn classify_node_project(content: &str) -> ProjectType {
    let Some(deps) = merged_node_deps(content) else {
        return ProjectType::JavaScript;
    };
    if deps.contains_key("react") {
        ProjectType::React
    } else if deps.contains_key("vue") {
        ProjectType::Vue
    } else if deps.contains_key("next") {
        ProjectType::NextJs
    } else if deps.contains_key("express") {
        ProjectType::NodeExpress
    } else {
        ProjectType::JavaScript
    }
}

fn pip_dependencies(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(split_requirement)
        .collect()
}

/// Split a requirements.txt line into (name, version spec).
fn split_requirement(line: &str) -> (String, String) {
    for operator in ["==", ">=", "<=", "~=", "!=", ">", "<"] {
        if let Some(idx) = line.find(operator) {
            let name = line[..idx].trim().to_string();
            let version = line[idx..].trim().to_string();
            return (name, version);
        }
    }
    (line.to_string(), String::new())
}

fn cargo_dependencies(content: &str) -> Option<BTreeMap<String, String>> {
    let manifest: toml::Value = toml::from_str(content).ok()?;
    let deps = manifest.get("dependencies")?.as_table()?;
    let mut parsed = BTreeMap::new();
    for (name, value) in deps {
        let version = match value {
            toml::Value::String(version) => version.clone(),
            toml::Value::Table(table) => table
                .get("version")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };
        parsed.insert(name.clone(), version);
    }
    Some(parsed)
}
