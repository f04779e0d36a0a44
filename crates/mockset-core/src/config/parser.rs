//! Template-file parsing (YAML/JSON) and glob-based loading.
//!
//! Endpoint templates can live in fixture files next to the tests:
//!
//! ```yaml
//! endpoints:
//!   - name: Fork
//!     url: https://example.com/api/fork
//!     method: POST
//!     status: 200
//!     json:
//!       id: fork101
//! ```
//!
//! [`load_registry`] accepts a path or glob pattern and merges every file
//! into one [`TemplateRegistry`], rejecting duplicate template names.

use crate::config::error::ConfigError;
use crate::types::template::{EndpointTemplate, TemplateRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Template file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileType {
    Yaml,
    Json,
    Unknown,
}

/// Get template file type from path extension
pub fn get_file_type(path: &str) -> ConfigFileType {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => ConfigFileType::Yaml,
        "json" => ConfigFileType::Json,
        _ => ConfigFileType::Unknown,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    endpoints: Vec<EndpointTemplate>,
}

/// Parse template declarations from file content, format chosen by the
/// path's extension.
pub fn parse_templates(content: &str, path: &str) -> Result<Vec<EndpointTemplate>, ConfigError> {
    let file: TemplateFile = match get_file_type(path) {
        ConfigFileType::Yaml => serde_yaml::from_str(content)?,
        ConfigFileType::Json => serde_json::from_str(content)?,
        ConfigFileType::Unknown => return Err(ConfigError::UnknownFileType(path.to_string())),
    };
    Ok(file.endpoints)
}

/// Load templates from every file matching a path or glob pattern.
///
/// Files are visited in sorted path order so the result is deterministic.
pub fn load_templates(pattern: &str) -> Result<Vec<EndpointTemplate>, ConfigError> {
    let mut paths: Vec<std::path::PathBuf> = glob::glob(pattern)?
        .map(|entry| {
            entry.map_err(|e| {
                let path = e.path().display().to_string();
                ConfigError::Io {
                    path,
                    source: e.into_error(),
                }
            })
        })
        .collect::<Result<_, _>>()?;
    paths.sort();

    let mut templates = Vec::new();
    for path in paths {
        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        templates.extend(parse_templates(&content, &path_str)?);
    }

    Ok(templates)
}

/// Load templates matching a pattern into a registry, failing on duplicate
/// template names.
pub fn load_registry(pattern: &str) -> Result<TemplateRegistry, ConfigError> {
    let mut registry = TemplateRegistry::new();
    for template in load_templates(pattern)? {
        let name = template.name.clone();
        if registry.insert(template).is_some() {
            return Err(ConfigError::DuplicateTemplate(name));
        }
    }
    Ok(registry)
}
