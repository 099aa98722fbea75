use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::naming::NamingStrategy;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Catalog file or the folder containing it. Discovered when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub naming: NamingStrategy,

    /// Relocation worker threads. Defaults to the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Config {
    /// Load from `INTO_FOLDERS_CONFIG` or the default location. A missing
    /// file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var_os("INTO_FOLDERS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("into-folders")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.naming, NamingStrategy::Indexed);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "catalog_path = \"/data/catalog\"\nnaming = \"natural\"\nworkers = 3\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.catalog_path, Some(PathBuf::from("/data/catalog")));
        assert_eq!(config.naming, NamingStrategy::Natural);
        assert_eq!(config.workers, Some(3));
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        assert!(toml::from_str::<Config>("naming = \"random\"").is_err());
    }
}
