use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ReaderSettings;
use crate::errors::Result;

/// Finds the Tailwind configuration file for a project
pub trait ConfigLocator {
    /// Path of the configuration file, or `None` if the project has none
    fn locate(&self) -> Result<Option<PathBuf>>;
}

/// Looks for a configuration file directly inside a project directory
#[derive(Debug, Clone)]
pub struct DirectoryLocator {
    root: PathBuf,
    file_names: Vec<String>,
}

impl DirectoryLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_settings(root, &ReaderSettings::default())
    }

    pub fn with_settings(root: impl Into<PathBuf>, settings: &ReaderSettings) -> Self {
        Self {
            root: root.into(),
            file_names: settings.config_file_names.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigLocator for DirectoryLocator {
    fn locate(&self) -> Result<Option<PathBuf>> {
        for name in &self.file_names {
            let candidate = self.root.join(name);
            if candidate.is_file() {
                debug!("Found configuration file {}", candidate.display());
                return Ok(Some(candidate));
            }
        }

        // fall back to any tailwind.config.* the known names missed
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&root).join("tailwind.config.*");
        let mut matches: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        matches.sort();

        if matches.is_empty() {
            debug!("No configuration file in {}", self.root.display());
        }

        Ok(matches.into_iter().next())
    }
}

/// A locator that always answers with a fixed path
impl ConfigLocator for PathBuf {
    fn locate(&self) -> Result<Option<PathBuf>> {
        Ok(self.is_file().then(|| self.clone()))
    }
}
