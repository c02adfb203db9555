//! Studio settings: defaults, then an optional YAML file, then environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StudioResult;
use crate::mount::DEFAULT_LOADING_TEXT;

pub const ENV_CATALOG_DIR: &str = "KITSTUDIO_CATALOG_DIR";
pub const ENV_LOADING_TEXT: &str = "KITSTUDIO_LOADING_TEXT";
pub const ENV_LOG: &str = "KITSTUDIO_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Directory of `*.yaml` catalog files.
    pub catalog_dir: PathBuf,
    /// Placeholder shown in a mount point while it loads.
    pub loading_text: String,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("catalog"),
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl StudioConfig {
    pub fn from_yaml_str(yaml: &str) -> StudioResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read the config file when given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> StudioResult<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from any key lookup (the process environment in [`Self::load`]).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CATALOG_DIR).filter(|v| !v.is_empty()) {
            self.catalog_dir = PathBuf::from(dir);
        }
        if let Some(text) = lookup(ENV_LOADING_TEXT) {
            self.loading_text = text;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = level;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = StudioConfig::from_yaml_str("loading_text: Fetching demos\n").unwrap();
        assert_eq!(config.loading_text, "Fetching demos");
        assert_eq!(config.catalog_dir, PathBuf::from("catalog"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_win_over_file() {
        let env: HashMap<&str, &str> = [(ENV_CATALOG_DIR, "/srv/demos"), (ENV_LOG, "debug")]
            .into_iter()
            .collect();
        let config = StudioConfig::from_yaml_str("catalog_dir: data\nlog_level: warn\n")
            .unwrap()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.catalog_dir, PathBuf::from("/srv/demos"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.loading_text, DEFAULT_LOADING_TEXT);
    }

    #[test]
    fn bad_yaml_is_config_error() {
        let err = StudioConfig::from_yaml_str("catalog_dir: [").unwrap_err();
        assert!(matches!(err, crate::error::StudioError::Config(_)));
    }
}
