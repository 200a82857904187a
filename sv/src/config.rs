//! Configuration for snippetvault

use eyre::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the persisted collection
    #[serde(rename = "store-path")]
    pub store_path: PathBuf,

    /// Persistence slot name (file stem under `store-path`)
    pub slot: String,

    /// Language used when `add` is given none
    #[serde(rename = "default-language")]
    pub default_language: String,

    /// Allowed language labels; empty allows any label
    pub languages: Vec<String>,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snippetvault")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            slot: crate::DEFAULT_SLOT.to_string(),
            default_language: crate::DEFAULT_LANGUAGE.to_string(),
            languages: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let default_paths = [
            Some(PathBuf::from(".snippetvault.yml")),
            dirs::config_dir().map(|p| p.join("snippetvault").join("snippetvault.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.slot, "snippets");
        assert_eq!(config.default_language, "plaintext");
        assert!(config.languages.is_empty());
        assert!(config.store_path.ends_with("snippetvault"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sv.yml");
        fs::write(&path, "store-path: /tmp/vault\nlanguages: [rust, python]\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/vault"));
        assert_eq!(config.languages, vec!["rust", "python"]);
        assert_eq!(config.slot, "snippets");
    }

    #[test]
    fn test_kebab_case_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sv.yml");
        fs::write(&path, "default-language: rust\nslot: vault\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.default_language, "rust");
        assert_eq!(config.slot, "vault");
        assert!(config.store_path.ends_with("snippetvault"));
    }

    #[test]
    fn test_unparseable_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sv.yml");
        fs::write(&path, "languages: {not: [a list\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
