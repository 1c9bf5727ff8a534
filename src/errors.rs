use std::time::Duration;
use thiserror::Error;

/// Main error type for the tailwind-config-reader crate
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration path: {0}")]
    InvalidPath(String),

    #[error("Failed to start interpreter '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("Error occurred while parsing configuration file: {0}")]
    ScriptFailed(String),

    #[error("Interpreter did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Configuration read was cancelled")]
    Cancelled,

    #[error("Interpreter produced unusable output: {0}")]
    InvalidOutput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {message}")]
    Settings { message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
