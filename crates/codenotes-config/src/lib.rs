use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding every annotation
    pub annotations_path: PathBuf,
    /// Glob patterns for documents that are never annotated or tracked
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Decides which documents carry annotations
#[derive(Debug, Default, Clone)]
pub struct DocumentFilter {
    ignore: Vec<Pattern>,
}

impl DocumentFilter {
    /// Whether annotations in `document` should be tracked
    pub fn is_tracked(&self, document: &str) -> bool {
        let document = document.strip_prefix("file://").unwrap_or(document);
        !self.ignore.iter().any(|pattern| pattern.matches(document))
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded annotations path
        config.annotations_path =
            Self::expand_path(&config.annotations_path).unwrap_or(config.annotations_path);

        config.ignore_patterns()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/codenotes");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn ignore_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.ignore
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Compile the ignore patterns into a filter for document ids
    pub fn document_filter(&self) -> Result<DocumentFilter, ConfigError> {
        Ok(DocumentFilter {
            ignore: self.ignore_patterns()?,
        })
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn config(ignore: &[&str]) -> Config {
        Config {
            annotations_path: PathBuf::from("/tmp/annotations.json"),
            ignore: ignore.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/codenotes/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = config(&["*/target/*"]);

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original.annotations_path, deserialized.annotations_path);
        assert_eq!(original.ignore, deserialized.ignore);
    }

    #[test]
    fn test_ignore_defaults_to_empty() {
        let config: Config = toml::from_str(r#"annotations_path = "/a.json""#).unwrap();

        assert!(config.ignore.is_empty());
        assert!(config.document_filter().unwrap().is_tracked("/repo/src/main.rs"));
    }

    #[test]
    fn test_is_tracked_honours_ignore_patterns() {
        let filter = config(&["*/target/*", "*.lock"]).document_filter().unwrap();

        assert!(!filter.is_tracked("/repo/target/debug/build.rs"));
        assert!(!filter.is_tracked("file:///repo/target/out.rs"));
        assert!(!filter.is_tracked("Cargo.lock"));
        assert!(filter.is_tracked("/repo/src/lib.rs"));
    }

    #[test]
    fn test_document_filter_rejects_invalid_pattern() {
        let config = config(&["*.rs", "[unclosed"]);

        let result = config.document_filter();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { ref pattern, .. }) if pattern == "[unclosed"
        ));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "annotations_path = \"/a.json\"\nignore = [\"[unclosed\"]\n",
        )
        .unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("CODENOTES_TEST_DIR", "/test/env/path");
        }

        let path = PathBuf::from("$CODENOTES_TEST_DIR/annotations.json");
        let expanded = Config::expand_path(&path);

        assert_eq!(
            expanded,
            Some(PathBuf::from("/test/env/path/annotations.json"))
        );

        unsafe {
            env::remove_var("CODENOTES_TEST_DIR");
        }
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/notes.json")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("notes.json"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = config(&["*.min.js"]);

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config.annotations_path, test_config.annotations_path);
        assert_eq!(loaded_config.ignore, vec!["*.min.js".to_string()]);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "annotations_path = ").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }
}
