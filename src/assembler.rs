//! Builds the [`TailwindConfiguration`] from the interpreter's JSON document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::normalizer::normalize_classes;
use crate::theme::{flatten, ThemeMap};

/// The theme model handed to completion and hover providers.
///
/// Built fresh for every read and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TailwindConfiguration {
    /// Global class-name prefix, if the configuration declares one
    pub prefix: Option<String>,

    /// Top-level theme values, without the `extend` section
    pub overridden_values: ThemeMap,

    /// Values from `theme.extend`, merged on top of the framework defaults by consumers
    pub extended_values: ThemeMap,

    /// Utility and component classes registered by plugins.
    ///
    /// `None` means no plugin data was found, which is not the same as an
    /// empty list: providers fall back to the built-in class set.
    pub plugin_classes: Option<Vec<String>>,

    /// Variants registered by plugins, with the same `None` semantics
    pub plugin_modifiers: Option<Vec<String>>,
}

impl TailwindConfiguration {
    pub fn has_plugin_data(&self) -> bool {
        self.plugin_classes.is_some() || self.plugin_modifiers.is_some()
    }

    /// Apply the configured prefix to a class name
    pub fn prefixed(&self, class: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, class),
            None => class.to_string(),
        }
    }
}

/// Plugin section of the document did not have the expected shape
#[derive(Debug, Error)]
enum PluginOutputError {
    #[error("`plugins` is not an object")]
    NotAnObject,

    #[error("`plugins.{0}` is not an array")]
    NotAnArray(&'static str),

    #[error("`plugins.{key}[{index}]` is not a string")]
    NotAString { key: &'static str, index: usize },
}

/// Plugin-derived fields, kept together so a failure drops both
#[derive(Debug, Default)]
struct PluginTokens {
    classes: Option<Vec<String>>,
    modifiers: Option<Vec<String>>,
}

/// Assemble a configuration from the harness output.
///
/// Returns `None` when the document has no `theme` section; such a file is
/// not a usable Tailwind configuration. Malformed plugin output only clears
/// the plugin fields.
pub fn assemble(document: &Value) -> Option<TailwindConfiguration> {
    let document = unwrap_default_export(document);

    let theme = match document.get("theme") {
        None | Some(Value::Null) => {
            debug!("Configuration document has no theme section");
            return None;
        }
        Some(theme) => theme,
    };

    let overridden_values = flatten(Some(theme), Some("extend")).unwrap_or_default();
    let extended_values = flatten(theme.get("extend"), None).unwrap_or_default();

    let prefix = match document.get("prefix") {
        None | Some(Value::Null) => None,
        Some(Value::String(prefix)) => Some(prefix.clone()),
        Some(other) => Some(other.to_string()),
    };

    let plugins = match document.get("plugins") {
        None | Some(Value::Null) => PluginTokens::default(),
        Some(plugins) => plugin_tokens(plugins).unwrap_or_else(|e| {
            warn!("Ignoring malformed plugin output: {}", e);
            PluginTokens::default()
        }),
    };

    Some(TailwindConfiguration {
        prefix,
        overridden_values,
        extended_values,
        plugin_classes: plugins.classes,
        plugin_modifiers: plugins.modifiers,
    })
}

/// A document whose only key is `default` is an unwrapped ES module export
fn unwrap_default_export(document: &Value) -> &Value {
    match document.as_object() {
        Some(object) if object.len() == 1 => object.get("default").unwrap_or(document),
        _ => document,
    }
}

fn plugin_tokens(plugins: &Value) -> Result<PluginTokens, PluginOutputError> {
    let plugins = plugins.as_object().ok_or(PluginOutputError::NotAnObject)?;

    let modifiers = plugins
        .get("modifiers")
        .map(|value| string_list(value, "modifiers"))
        .transpose()?;

    let classes = plugins
        .get("classes")
        .map(|value| string_list(value, "classes"))
        .transpose()?
        .map(normalize_classes);

    Ok(PluginTokens { classes, modifiers })
}

fn string_list(value: &Value, key: &'static str) -> Result<Vec<String>, PluginOutputError> {
    value
        .as_array()
        .ok_or(PluginOutputError::NotAnArray(key))?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or(PluginOutputError::NotAString { key, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeValue;
    use serde_json::json;

    #[test]
    fn test_missing_theme_is_unusable() {
        assert!(assemble(&json!({ "content": ["./src/**/*.html"] })).is_none());
        assert!(assemble(&json!({ "theme": null })).is_none());
        assert!(assemble(&json!({})).is_none());
    }

    #[test]
    fn test_extend_is_split_out() {
        let config = assemble(&json!({
            "theme": {
                "colors": { "brand": "#0066cc" },
                "extend": { "spacing": { "128": "32rem" } }
            }
        }))
        .unwrap();

        assert!(!config.overridden_values.contains_key("extend"));
        assert_eq!(
            config.overridden_values["colors"].lookup("brand"),
            Some(&ThemeValue::Scalar("#0066cc".to_string()))
        );
        assert_eq!(
            config.extended_values["spacing"].lookup("128").and_then(ThemeValue::as_scalar),
            Some("32rem")
        );
    }

    #[test]
    fn test_absent_extend_is_empty() {
        let config = assemble(&json!({ "theme": { "screens": { "sm": "640px" } } })).unwrap();
        assert!(config.extended_values.is_empty());
        assert!(!config.overridden_values.contains_key("extend"));
    }

    #[test]
    fn test_default_export_is_unwrapped() {
        let config = assemble(&json!({ "default": { "prefix": "tw-", "theme": {} } })).unwrap();
        assert_eq!(config.prefix.as_deref(), Some("tw-"));
    }

    #[test]
    fn test_default_key_alongside_others_is_not_unwrapped() {
        let document = json!({ "default": { "theme": {} }, "content": [] });
        assert!(assemble(&document).is_none());
    }

    #[test]
    fn test_prefix() {
        let config = assemble(&json!({ "theme": {} })).unwrap();
        assert_eq!(config.prefix, None);
        assert_eq!(config.prefixed("flex"), "flex");

        let config = assemble(&json!({ "theme": {}, "prefix": "tw-" })).unwrap();
        assert_eq!(config.prefixed("flex"), "tw-flex");
    }

    #[test]
    fn test_no_plugins_means_none() {
        let config = assemble(&json!({ "theme": {} })).unwrap();
        assert_eq!(config.plugin_classes, None);
        assert_eq!(config.plugin_modifiers, None);
        assert!(!config.has_plugin_data());
    }

    #[test]
    fn test_empty_plugin_lists_stay_empty() {
        let config = assemble(&json!({ "theme": {}, "plugins": { "classes": [], "modifiers": [] } })).unwrap();
        assert_eq!(config.plugin_classes, Some(vec![]));
        assert_eq!(config.plugin_modifiers, Some(vec![]));
    }

    #[test]
    fn test_plugin_classes_are_normalized() {
        let config = assemble(&json!({
            "theme": {},
            "plugins": {
                "classes": [".btn", ".btn:hover", "@keyframes spin", "width-full", "width-[]"],
                "modifiers": ["hocus", "aria-[]"]
            }
        }))
        .unwrap();

        assert_eq!(
            config.plugin_classes,
            Some(vec!["btn".to_string(), "width-full".to_string(), "width-[]".to_string()])
        );
        assert_eq!(
            config.plugin_modifiers,
            Some(vec!["hocus".to_string(), "aria-[]".to_string()])
        );
    }

    #[test]
    fn test_malformed_plugins_degrade_only_plugin_fields() {
        let config = assemble(&json!({
            "theme": { "colors": { "brand": "#000" } },
            "prefix": "x-",
            "plugins": { "classes": [".ok", 42], "modifiers": ["hocus"] }
        }))
        .unwrap();

        assert_eq!(config.plugin_classes, None);
        assert_eq!(config.plugin_modifiers, None);
        assert_eq!(config.prefix.as_deref(), Some("x-"));
        assert!(config.overridden_values.contains_key("colors"));

        let config = assemble(&json!({ "theme": {}, "plugins": ["not", "harvested"] })).unwrap();
        assert!(!config.has_plugin_data());
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let document = json!({
            "theme": { "extend": { "colors": { "a": "1" } }, "fontFamily": { "sans": ["Inter"] } },
            "plugins": { "classes": [".x", ".y"], "modifiers": [] }
        });
        assert_eq!(assemble(&document), assemble(&document));
    }
}
