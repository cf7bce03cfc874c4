use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error_handling::types::ConfigError;

pub const DEFAULT_DIRECTORY: &str = "screenshots";
pub const DEFAULT_EVICTION_THRESHOLD: usize = 9999;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 50;

pub const DIRECTORY_ENV: &str = "SCREENSHOTS_DIR";
pub const EVICTION_THRESHOLD_ENV: &str = "SCREENSHOTS_EVICTION_THRESHOLD";
pub const MAX_NAME_LENGTH_ENV: &str = "SCREENSHOTS_MAX_NAME_LENGTH";

/// Settings for one artifact directory.
///
/// Every field has a default, so a TOML file only needs to mention what it
/// changes:
///
/// ```toml
/// directory = "/var/tmp/shots"
/// eviction_threshold = 200
/// max_name_length = 40
/// ```
///
/// # Fields Overview
///
/// - `directory`: where artifacts and counter files live; created on open
/// - `eviction_threshold`: once more artifacts than this exist, the oldest
///   `eviction_threshold / 2` are deleted
/// - `max_name_length`: cap on the file stem (identity plus label), before
///   the `.png` extension
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub directory: PathBuf,
    pub eviction_threshold: usize,
    pub max_name_length: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            eviction_threshold: DEFAULT_EVICTION_THRESHOLD,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_eviction_threshold(mut self, eviction_threshold: usize) -> Self {
        self.eviction_threshold = eviction_threshold;
        self
    }

    pub fn with_max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded store configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults overridden by `SCREENSHOTS_DIR`,
    /// `SCREENSHOTS_EVICTION_THRESHOLD` and `SCREENSHOTS_MAX_NAME_LENGTH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(DIRECTORY_ENV) {
            info!("Using artifact directory from {}: {}", DIRECTORY_ENV, dir);
            config.directory = PathBuf::from(dir);
        }
        if let Some(value) = read_usize_env(EVICTION_THRESHOLD_ENV)? {
            config.eviction_threshold = value;
        }
        if let Some(value) = read_usize_env(MAX_NAME_LENGTH_ENV)? {
            config.max_name_length = value;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eviction_threshold == 0 {
            return Err(ConfigError::NotInRange(
                "eviction_threshold must be at least 1".to_string(),
            ));
        }
        if self.max_name_length == 0 {
            return Err(ConfigError::NotInRange(
                "max_name_length must be at least 1".to_string(),
            ));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::NotInRange(
                "directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_usize_env(name: &str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| ConfigError::NotInRange(format!("{}={:?}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}
