//! Configuration management

use anyhow::Result;
use directories::ProjectDirs;
use magpie_core::InternalLinkPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Base URL of a running relay; unset means start one in-process
    #[serde(default)]
    pub relay: Option<String>,

    /// Search data-src / data-fallback-src attributes by default
    #[serde(default)]
    pub data_attributes: bool,

    /// Internal link rewriting: "origin" or "resolve"
    #[serde(default = "default_internal_links")]
    pub internal_links: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            relay: None,
            data_attributes: false,
            internal_links: default_internal_links(),
        }
    }
}

fn default_internal_links() -> String {
    "origin".to_string()
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: Config = toml::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "magpie", "magpie")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The configured internal-link policy; unknown values fall back to the
    /// origin-only default.
    pub fn link_policy(&self) -> InternalLinkPolicy {
        match self.general.internal_links.as_str() {
            "resolve" => InternalLinkPolicy::Resolve,
            _ => InternalLinkPolicy::OriginOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.relay, None);
        assert!(!config.general.data_attributes);
        assert_eq!(config.link_policy(), InternalLinkPolicy::OriginOnly);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.general.data_attributes = true;
        config.general.internal_links = "resolve".to_string();

        let text = toml::to_string_pretty(&config).unwrap();
        let reloaded: Config = toml::from_str(&text).unwrap();
        assert!(reloaded.general.data_attributes);
        assert_eq!(reloaded.link_policy(), InternalLinkPolicy::Resolve);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[general]\ndata_attributes = true\n").unwrap();
        assert!(config.general.data_attributes);
        assert_eq!(config.general.internal_links, "origin");
    }
}
