//! Registry indexing.
//! Every subdirectory of the registry is a template and must carry a manifest;
//! a broken entry fails the whole pass instead of silently disappearing.

use crate::cancel::CancellationToken;
use crate::config::ScaffoldConfig;
use crate::error::{Error, Result};
use crate::manifest::TemplateManifest;
use crate::template::Template;
use crate::workers::run_all;
use log::{debug, warn};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Builds the catalog of templates available in a registry.
#[derive(Debug, Clone)]
pub struct TemplateIndexer {
    config: ScaffoldConfig,
}

impl TemplateIndexer {
    pub fn new(config: ScaffoldConfig) -> Self {
        Self { config }
    }

    /// Reads and parses every template manifest of the configured registry.
    ///
    /// Manifests are read concurrently; the catalog is returned in listing
    /// order, which is the directory names sorted.
    ///
    /// # Errors
    /// * `Error::IndexError` if the registry cannot be listed or an entry has no manifest
    /// * `Error::ManifestError` if a manifest cannot be parsed
    /// * `Error::Cancelled` if the token fires before every entry was read
    pub fn index(&self, cancel: &CancellationToken) -> Result<Vec<Template>> {
        debug!("Loading templates from {}", self.config.registry.display());

        let candidates = self.candidates()?;
        let templates = run_all(&candidates, cancel, |dir| self.read_template(dir))?;

        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.name()) {
                warn!(
                    "Template name '{}' is used more than once, {} is not selectable by name",
                    template.name(),
                    template.path.display()
                );
            }
        }

        debug!("Done loading templates, found {}", templates.len());
        Ok(templates)
    }

    /// Lists candidate template directories, sorted by name. Hidden
    /// directories and plain files are not candidates.
    fn candidates(&self) -> Result<Vec<PathBuf>> {
        let registry = &self.config.registry;
        let index_error = |e: io::Error| Error::IndexError {
            path: registry.display().to_string(),
            reason: format!("failed to read templates dir: {e}"),
        };

        let mut candidates = Vec::new();
        for entry in fs::read_dir(registry).map_err(index_error)? {
            let entry = entry.map_err(index_error)?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');

            if hidden || !path.is_dir() {
                debug!("Skipping registry entry {}", path.display());
                continue;
            }
            candidates.push(path);
        }
        candidates.sort();

        Ok(candidates)
    }

    fn read_template(&self, dir: &Path) -> Result<Template> {
        let manifest_path = dir.join(&self.config.manifest_file);
        let content = fs::read_to_string(&manifest_path).map_err(|e| Error::IndexError {
            path: dir.display().to_string(),
            reason: match e.kind() {
                io::ErrorKind::NotFound => format!("missing {}", self.config.manifest_file),
                _ => format!("failed to read {}: {e}", manifest_path.display()),
            },
        })?;

        let manifest = TemplateManifest::parse(&content, &manifest_path.display().to_string())?;
        debug!(
            "Indexed template '{}' from {}",
            manifest.name,
            dir.display()
        );

        Ok(Template::new(manifest, dir))
    }
}
