//! Configuration Management
//!
//! Handles persistent configuration storage for tfarch.

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_STATE_FILE: &str = "terraform_state.json";
const DEFAULT_MAIN_TF: &str = "main.tf";

/// Serialization format for written documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// State export to read when no --state is given
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    /// Configuration file scanned for the region declaration
    #[serde(default)]
    pub main_tf: Option<PathBuf>,
    /// Directory for `build` output
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    /// Classify subnets as public/private (default on)
    #[serde(default)]
    pub derive_visibility: Option<bool>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tfarch").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_json(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse configuration, falling back to defaults on malformed content
    pub fn from_json(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective state file (CLI > config > default)
    pub fn effective_state_file(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.state_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }

    /// Get effective main.tf path (CLI > config > default)
    pub fn effective_main_tf(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.main_tf.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MAIN_TF))
    }

    /// Get effective output directory (CLI > config > current dir)
    pub fn effective_output_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn effective_format(&self, cli: Option<OutputFormat>) -> OutputFormat {
        cli.or(self.output_format).unwrap_or_default()
    }

    pub fn effective_derive_visibility(&self) -> bool {
        self.derive_visibility.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_beats_config_beats_default() {
        let config = Config::from_json(r#"{"state_file": "from-config.json"}"#);

        assert_eq!(
            config.effective_state_file(Some(PathBuf::from("cli.json"))),
            PathBuf::from("cli.json")
        );
        assert_eq!(
            config.effective_state_file(None),
            PathBuf::from("from-config.json")
        );
        assert_eq!(config.effective_main_tf(None), PathBuf::from("main.tf"));
    }

    #[test]
    fn test_format_and_visibility_defaults() {
        let config = Config::default();
        assert_eq!(config.effective_format(None), OutputFormat::Json);
        assert!(config.effective_derive_visibility());

        let config = Config::from_json(r#"{"output_format": "yaml", "derive_visibility": false}"#);
        assert_eq!(config.effective_format(None), OutputFormat::Yaml);
        assert!(!config.effective_derive_visibility());
    }

    #[test]
    fn test_malformed_config_is_default() {
        let config = Config::from_json("{not json");
        assert!(config.state_file.is_none());
    }
}
