//! Configuration management for phash.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every missing field. A missing file means an all-default configuration.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File selection and concurrency
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Hashing and comparison
    pub hash: HashConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path (`~` is expanded).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.phash.phash/config.toml
    /// - Linux: ~/.config/phash/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\phash\config\config.toml
    ///
    /// Falls back to ~/.phash/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "phash", "phash")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".phash").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.hash.similarity_threshold, 10);
        assert!(config.hash.content_hash);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[hash]"));
        assert!(toml.contains("similarity_threshold = 10"));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hash]\nsimilarity_threshold = 6\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.hash.similarity_threshold, 6);
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hash]\nsimilarity_threshold = 65\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[hash\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = Config::default();
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(
            parsed.processing.supported_formats,
            config.processing.supported_formats
        );
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(
            expand_tilde(Path::new("/etc/phash.toml")),
            PathBuf::from("/etc/phash.toml")
        );
    }
}
