//! Configuration handling for scaffold.
//! Holds the registry location and the file naming conventions every
//! component works with, so nothing reads process-wide paths on its own.

use crate::constants::{
    DEFAULT_REGISTRY_DIR, FILES_DIR, MANIFEST_FILE, REGISTRY_PATH_ENV, TEMPLATE_SUFFIX,
};
use crate::error::{Error, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Explicit configuration passed to the indexer and the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldConfig {
    /// Resolved local directory containing one subdirectory per template
    pub registry: PathBuf,
    /// Manifest file name inside every template directory
    pub manifest_file: String,
    /// Payload directory name inside every template directory
    pub files_dir: String,
    /// Marker suffix stripped from rendered file names
    pub template_suffix: String,
}

impl ScaffoldConfig {
    /// Creates a configuration for the given registry using the default conventions.
    pub fn new<P: AsRef<Path>>(registry: P) -> Self {
        Self {
            registry: registry.as_ref().to_path_buf(),
            manifest_file: MANIFEST_FILE.to_string(),
            files_dir: FILES_DIR.to_string(),
            template_suffix: TEMPLATE_SUFFIX.to_string(),
        }
    }

    /// Resolves the registry location from the environment.
    ///
    /// `SCAFFOLD_REGISTRY_PATH` wins when set, otherwise the registry is
    /// expected at `$HOME/.scaffold/upstream/registry`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if neither variable is available
    pub fn from_env() -> Result<Self> {
        if let Ok(registry) = std::env::var(REGISTRY_PATH_ENV) {
            if !registry.trim().is_empty() {
                debug!("Using registry from {REGISTRY_PATH_ENV}: {registry}");
                return Ok(Self::new(registry));
            }
        }

        let home = std::env::var("HOME").map_err(|_| {
            Error::ConfigError(format!(
                "cannot locate the registry, set {REGISTRY_PATH_ENV} or HOME"
            ))
        })?;

        Ok(Self::new(Self::default_registry(home)))
    }

    /// Returns the default registry location below the given home directory.
    pub fn default_registry<P: AsRef<Path>>(home: P) -> PathBuf {
        let mut registry = home.as_ref().to_path_buf();
        registry.extend(DEFAULT_REGISTRY_DIR);
        registry
    }

    pub fn with_registry<P: AsRef<Path>>(mut self, registry: P) -> Self {
        self.registry = registry.as_ref().to_path_buf();
        self
    }

    pub fn with_template_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.template_suffix = suffix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_conventions() {
        let config = ScaffoldConfig::new("/tmp/registry");
        assert_eq!(config.registry, PathBuf::from("/tmp/registry"));
        assert_eq!(config.manifest_file, "scaffold.yaml");
        assert_eq!(config.files_dir, "files");
        assert_eq!(config.template_suffix, ".tmpl");
    }

    #[test]
    fn test_default_registry() {
        assert_eq!(
            ScaffoldConfig::default_registry("/home/user"),
            PathBuf::from("/home/user/.scaffold/upstream/registry")
        );
    }

    #[test]
    fn test_builders() {
        let config = ScaffoldConfig::new("a")
            .with_registry("b")
            .with_template_suffix(".j2");
        assert_eq!(config.registry, PathBuf::from("b"));
        assert_eq!(config.template_suffix, ".j2");
    }
}
