use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::assembler::TailwindConfiguration;

/// Metadata describing a configuration read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Version of the report format
    pub version: String,

    /// When the configuration was read
    pub generated_at: DateTime<Utc>,

    /// Configuration file that was evaluated
    pub config_path: String,

    /// Number of plugin classes, if plugins were harvested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_count: Option<usize>,

    /// Number of plugin modifiers, if plugins were harvested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier_count: Option<usize>,

    /// Reader version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader_version: Option<String>,
}

/// A configuration read, as printed by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationReport {
    pub metadata: ReportMetadata,
    pub configuration: TailwindConfiguration,
}

impl ConfigurationReport {
    pub fn new(config_path: &Path, configuration: TailwindConfiguration) -> Self {
        Self {
            metadata: ReportMetadata {
                version: "1.0.0".to_string(),
                generated_at: Utc::now(),
                config_path: config_path.display().to_string(),
                class_count: configuration.plugin_classes.as_ref().map(Vec::len),
                modifier_count: configuration.plugin_modifiers.as_ref().map(Vec::len),
                reader_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            configuration,
        }
    }

    /// Convert report to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Convert report to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert report to compact JSON string
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
