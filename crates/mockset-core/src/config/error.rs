//! Error types for template-file loading.

use std::fmt;

/// Template-file loading error
#[derive(Debug)]
pub enum ConfigError {
    /// File read error
    Io { path: String, source: std::io::Error },
    /// JSON parsing error
    Json(serde_json::Error),
    /// YAML parsing error
    Yaml(serde_yaml::Error),
    /// Unknown file type
    UnknownFileType(String),
    /// Invalid glob pattern
    Pattern(glob::PatternError),
    /// Two files declare a template with the same name
    DuplicateTemplate(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Failed to read {}: {}", path, source),
            ConfigError::Json(e) => write!(f, "JSON parsing error: {}", e),
            ConfigError::Yaml(e) => write!(f, "YAML parsing error: {}", e),
            ConfigError::UnknownFileType(path) => write!(f, "Unknown file type: {}", path),
            ConfigError::Pattern(e) => write!(f, "Invalid glob pattern: {}", e),
            ConfigError::DuplicateTemplate(name) => {
                write!(f, "Duplicate endpoint template: {}", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

impl From<glob::PatternError> for ConfigError {
    fn from(err: glob::PatternError) -> Self {
        ConfigError::Pattern(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::error::Error;

    #[rstest]
    fn test_json_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = ConfigError::from(json_err);
        assert!(error.to_string().contains("JSON parsing error"));
        assert!(error.source().is_some());
    }

    #[rstest]
    fn test_yaml_error_display() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("invalid: yaml: [").unwrap_err();
        let error = ConfigError::from(yaml_err);
        assert!(error.to_string().contains("YAML parsing error"));
        assert!(error.source().is_some());
    }

    #[rstest]
    #[case("endpoints.toml")]
    #[case("endpoints")]
    #[case("")]
    fn test_unknown_file_type_display(#[case] path: &str) {
        let error = ConfigError::UnknownFileType(path.to_string());
        assert!(error.to_string().contains("Unknown file type"));
        assert!(error.to_string().contains(path));
        assert!(error.source().is_none());
    }

    #[rstest]
    fn test_io_error_names_the_path() {
        let error = ConfigError::Io {
            path: "mocks/endpoints.yaml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.to_string().contains("mocks/endpoints.yaml"));
        assert!(error.source().is_some());
    }

    #[rstest]
    fn test_pattern_error_from_glob() {
        let pattern_err = glob::Pattern::new("a[").unwrap_err();
        let error: ConfigError = pattern_err.into();
        assert!(matches!(error, ConfigError::Pattern(_)));
        assert!(error.to_string().contains("Invalid glob pattern"));
    }

    #[rstest]
    fn test_duplicate_template_display() {
        let error = ConfigError::DuplicateTemplate("Push".to_string());
        assert_eq!(error.to_string(), "Duplicate endpoint template: Push");
        assert!(error.source().is_none());
    }
}
