//! Shell configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`ShellConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Session options.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use conch::ShellConfig;
///
/// let config = ShellConfig::from_json(r#"{ "prompt": "db> " }"#).unwrap();
/// assert_eq!(config.prompt, "db> ");
/// assert!(config.builtins);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt shown by the session loop.
    pub prompt: String,

    /// Register the built-in commands (`help`, `exit`, `exec`, `sh`).
    pub builtins: bool,

    /// List valid names after an unknown command.
    pub suggest_on_unknown: bool,

    /// Colored output for the terminal console.
    pub color: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            builtins: true,
            suggest_on_unknown: true,
            color: true,
        }
    }
}

impl ShellConfig {
    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
