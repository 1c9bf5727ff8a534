use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use crate::errors::{ConfigError, Result};

/// Settings for reading Tailwind configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    /// Interpreter program used to evaluate configuration files
    pub interpreter: String,

    /// Extra arguments passed to the interpreter before the script is piped in
    pub interpreter_args: Vec<String>,

    /// Stderr lines containing this marker are treated as warnings, not failures
    pub warning_marker: String,

    /// Kill the interpreter after this many milliseconds (`None` waits forever)
    pub timeout_ms: Option<u64>,

    /// Configuration file names looked up in a project directory, in order
    pub config_file_names: Vec<String>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            interpreter: "node".to_string(),
            interpreter_args: Vec::new(),
            warning_marker: "warn".to_string(),
            timeout_ms: Some(30_000),
            config_file_names: vec![
                "tailwind.config.js".to_string(),
                "tailwind.config.cjs".to_string(),
                "tailwind.config.mjs".to_string(),
                "tailwind.config.ts".to_string(),
            ],
        }
    }
}

impl ReaderSettings {
    /// Load settings from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings {
                message: format!("Failed to read settings file {}: {}", path.display(), e),
            })?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Settings {
                message: format!("Failed to parse YAML settings: {}", e),
            })
    }

    /// Load settings from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings {
                message: format!("Failed to read settings file {}: {}", path.display(), e),
            })?;

        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Settings {
                message: format!("Failed to parse JSON settings: {}", e),
            })
    }

    /// Load settings from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::Settings {
                message: format!(
                    "Unsupported settings file format: {}. Use .yaml, .yml, or .json",
                    path.display()
                ),
            }),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
