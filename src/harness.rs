//! Harness script fed to the interpreter.
//!
//! The script shims the Tailwind plugin API: it answers `require('tailwindcss/plugin')`
//! and `import ... from 'tailwindcss/plugin'` itself, loads the user
//! configuration (CommonJS first, ESM for `.mjs` or as a fallback), replays
//! every plugin against recording mocks and prints the configuration as a
//! single JSON line. Everything the configuration logs on its own is
//! swallowed until that line is written.

use serde_json::Value;
use std::path::Path;

use crate::errors::{ConfigError, Result};

const HARNESS_TEMPLATE: &str = include_str!("harness.js");

/// Placeholder replaced with the quoted configuration file name
const CONFIG_FILE_PLACEHOLDER: &str = "__CONFIG_FILE__";

/// A harness script bound to one configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessScript {
    config_file_name: String,
}

impl HarnessScript {
    /// Harness for a configuration file in the interpreter's working directory
    pub fn for_config_file(file_name: impl Into<String>) -> Self {
        Self {
            config_file_name: file_name.into(),
        }
    }

    /// Harness for a configuration path; only the file name is embedded, the
    /// interpreter is expected to run in the path's directory
    pub fn for_config_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ConfigError::InvalidPath(path.display().to_string()))?;

        Ok(Self::for_config_file(file_name))
    }

    pub fn config_file_name(&self) -> &str {
        &self.config_file_name
    }

    /// Render the script text
    pub fn render(&self) -> String {
        // a JSON string literal is a valid JS string literal
        let quoted = Value::String(self.config_file_name.clone()).to_string();
        HARNESS_TEMPLATE.replace(CONFIG_FILE_PLACEHOLDER, &quoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_embeds_quoted_file_name() {
        let script = HarnessScript::for_config_file("tailwind.config.js").render();
        assert!(script.contains(r#"const configFile = "tailwind.config.js";"#));
        assert!(!script.contains(CONFIG_FILE_PLACEHOLDER));
    }

    #[test]
    fn test_render_escapes_file_name() {
        let script = HarnessScript::for_config_file(r#"we"ird\name.js"#).render();
        assert!(script.contains(r#"const configFile = "we\"ird\\name.js";"#));
    }

    #[test]
    fn test_for_config_path_uses_file_name_only() {
        let harness = HarnessScript::for_config_path(&PathBuf::from("/projects/site/tailwind.config.cjs")).unwrap();
        assert_eq!(harness.config_file_name(), "tailwind.config.cjs");
    }

    #[test]
    fn test_for_config_path_rejects_root() {
        let result = HarnessScript::for_config_path(Path::new("/"));
        assert!(matches!(result, Err(ConfigError::InvalidPath(_))));
    }

    #[test]
    fn test_script_shims_plugin_api() {
        let script = HarnessScript::for_config_file("tailwind.config.js").render();
        for hook in [
            "'tailwindcss/plugin'",
            "addUtilities",
            "addComponents",
            "matchUtilities",
            "matchComponents",
            "addVariant",
            "matchVariant",
            "corePlugins",
            "addBase",
            "registerHooks",
        ] {
            assert!(script.contains(hook), "harness should provide {}", hook);
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let harness = HarnessScript::for_config_file("tailwind.config.mjs");
        assert_eq!(harness.render(), harness.render());
    }
}
