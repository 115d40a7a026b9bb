//! Configuration loading for the debugger.
//!
//! All debugger settings are loaded from a TOML configuration file. Every
//! section is optional; missing values fall back to the defaults the panel
//! ships with.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::ClassifierRule;

/// Complete debugger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebuggerConfig {
    /// Classification rule table
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Event list rendering settings
    #[serde(default)]
    pub render: RenderConfig,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

impl DebuggerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Ordered classification rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Rules checked in order; the first matching rule wins
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: ClassifierRule::default_rules(),
        }
    }
}

/// Event list rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum rows kept in the visible list
    pub max_rows: usize,
    /// Parameters shown in a compact row
    pub preview_params: usize,
    /// Characters kept of each previewed value
    pub preview_value_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_rows: 100,
            preview_params: 3,
            preview_value_len: 15,
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name prefix, followed by `-YYYY-MM-DD.json`
    pub file_prefix: String,
    /// Directory export files are written to
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: "ga4-events".to_string(),
            directory: PathBuf::from("."),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// Error serializing TOML config
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> Result<String, ConfigError> {
    DebuggerConfig::default().to_toml()
}
