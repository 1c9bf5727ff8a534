//! Reading a configuration file end to end: harness, interpreter, assembly.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::assembler::{assemble, TailwindConfiguration};
use crate::errors::{ConfigError, Result};
use crate::harness::HarnessScript;
use crate::locator::ConfigLocator;
use crate::transport::{CancelToken, ScriptInterpreter};

/// Parses Tailwind configuration files by evaluating them in an interpreter
#[derive(Debug, Clone)]
pub struct ConfigFileParser<I> {
    interpreter: I,
}

impl<I: ScriptInterpreter> ConfigFileParser<I> {
    pub fn new(interpreter: I) -> Self {
        Self { interpreter }
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Evaluate the configuration file and return the raw JSON document
    pub async fn config_json(&self, path: &Path, cancel: Option<&CancelToken>) -> Result<Value> {
        let harness = HarnessScript::for_config_path(path)?;
        let working_directory = working_directory(path);

        let output = self
            .interpreter
            .interpret(&harness.render(), &working_directory, cancel)
            .await?;

        if output.is_empty() {
            return Err(ConfigError::InvalidOutput(format!(
                "no output while evaluating {}",
                path.display()
            )));
        }

        let document: Value = serde_json::from_str(&output)?;
        if !document.is_object() {
            return Err(ConfigError::InvalidOutput(format!(
                "expected a JSON object from {}, got {}",
                path.display(),
                output
            )));
        }

        Ok(document)
    }

    /// Read the configuration at `path`.
    ///
    /// `Ok(None)` means the file evaluated fine but has no `theme` section.
    pub async fn configuration(
        &self,
        path: &Path,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<TailwindConfiguration>> {
        let document = self.config_json(path, cancel).await?;
        let configuration = assemble(&document);

        match &configuration {
            Some(configuration) => debug!(
                "Read {}: {} theme keys, {} extended keys, {} plugin classes, {} plugin modifiers",
                path.display(),
                configuration.overridden_values.len(),
                configuration.extended_values.len(),
                configuration.plugin_classes.as_ref().map_or(0, Vec::len),
                configuration.plugin_modifiers.as_ref().map_or(0, Vec::len),
            ),
            None => info!("{} has no theme section, ignoring it", path.display()),
        }

        Ok(configuration)
    }

    /// Locate the configuration file, then read it.
    ///
    /// `Ok(None)` when there is no configuration file or it has no theme.
    pub async fn configuration_in<L: ConfigLocator>(
        &self,
        locator: &L,
        cancel: Option<&CancelToken>,
    ) -> Result<Option<(PathBuf, TailwindConfiguration)>> {
        let path = match locator.locate()? {
            Some(path) => path,
            None => {
                debug!("No Tailwind configuration file found");
                return Ok(None);
            }
        };

        let configuration = self.configuration(&path, cancel).await?;
        Ok(configuration.map(|configuration| (path, configuration)))
    }
}

/// The interpreter runs next to the configuration so relative imports resolve
fn working_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Holds the last configuration that was read successfully.
///
/// Snapshots are replaced wholesale; a failed read leaves the previous one
/// in place so completions keep working while the user fixes the file.
#[derive(Debug, Default)]
pub struct ConfigurationStore {
    current: RwLock<Option<Arc<TailwindConfiguration>>>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, if any configuration was read yet
    pub fn current(&self) -> Option<Arc<TailwindConfiguration>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the snapshot
    pub fn replace(&self, configuration: TailwindConfiguration) -> Arc<TailwindConfiguration> {
        let snapshot = Arc::new(configuration);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Re-read `path` and swap in the result.
    ///
    /// Returns `Ok(true)` when the snapshot was replaced and `Ok(false)` when
    /// the file has no usable theme. Errors leave the snapshot untouched.
    pub async fn refresh<I: ScriptInterpreter>(
        &self,
        parser: &ConfigFileParser<I>,
        path: &Path,
        cancel: Option<&CancelToken>,
    ) -> Result<bool> {
        match parser.configuration(path, cancel).await {
            Ok(Some(configuration)) => {
                self.replace(configuration);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                warn!("Keeping previous Tailwind configuration: {}", e);
                Err(e)
            }
        }
    }
}
