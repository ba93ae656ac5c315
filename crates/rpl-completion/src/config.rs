/// Configuration loading for completion and formatting
use crate::formatter::FormatMode;
use crate::parser::VocabularyMode;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-level configuration directory, relative to the project root
pub const PROJECT_CONFIG_DIR: &str = ".rpl";

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Completion behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Whether keywords and operators are static or matched against the document
    pub vocabulary_mode: VocabularyMode,
    /// Offer the function declaration snippets
    pub snippets: bool,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            vocabulary_mode: VocabularyMode::Static,
            snippets: true,
        }
    }
}

/// Formatter behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    pub mode: FormatMode,
    /// External formatter executable
    pub command: String,
    /// Arguments passed before the temporary file path
    pub args: Vec<String>,
    /// Maximum time the external formatter may run
    pub timeout_secs: u64,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            mode: FormatMode::Identity,
            command: "rustfmt".to_string(),
            args: vec!["--edition".to_string(), "2021".to_string()],
            timeout_secs: 10,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RplConfig {
    pub completion: CompletionSettings,
    pub formatter: FormatterSettings,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> CompletionResult<RplConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: RplConfig = serde_yaml::from_str(&content)?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> CompletionResult<RplConfig> {
        let content = std::fs::read_to_string(path)?;
        let config: RplConfig = serde_json::from_str(&content)?;
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(content: &str, format: ConfigFormat) -> CompletionResult<RplConfig> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a file, picking the format by extension
    pub fn load_from_path(path: &Path) -> CompletionResult<RplConfig> {
        match ConfigFormat::from_path(path) {
            Some(ConfigFormat::Yaml) => Self::load_from_yaml(path),
            Some(ConfigFormat::Json) => Self::load_from_json(path),
            None => Err(CompletionError::ConfigError(format!(
                "Unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    /// Load configuration with hierarchy: Project → Default
    ///
    /// Looks for `config.yaml`, `config.yml` then `config.json` under
    /// `<project_root>/.rpl/`. A file that exists but fails to load is an
    /// error; no file at all yields the defaults.
    pub fn load_with_hierarchy(project_root: &Path) -> CompletionResult<RplConfig> {
        match Self::find_project_config(project_root) {
            Some(path) => {
                debug!("Loading RPL configuration from {}", path.display());
                Self::load_from_path(&path)
            }
            None => {
                debug!("No project configuration found, using defaults");
                Ok(RplConfig::default())
            }
        }
    }

    /// Locate the project configuration file, if any
    pub fn find_project_config(project_root: &Path) -> Option<PathBuf> {
        let dir = project_root.join(PROJECT_CONFIG_DIR);
        ["config.yaml", "config.yml", "config.json"]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Validate configuration
    fn validate_config(config: &RplConfig) -> CompletionResult<()> {
        let formatter = &config.formatter;

        if formatter.mode == FormatMode::External && formatter.command.trim().is_empty() {
            return Err(CompletionError::ConfigError(
                "Formatter command cannot be empty in external mode".to_string(),
            ));
        }

        if formatter.timeout_secs == 0 {
            return Err(CompletionError::ConfigError(
                "Formatter timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
