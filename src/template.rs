//! Runtime template instances.
//! A [`Template`] ties a parsed manifest to its source directory and to the
//! input values resolved for one run.

use crate::error::{Error, Result};
use crate::manifest::TemplateManifest;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub manifest: TemplateManifest,
    /// Template source directory inside the registry
    pub path: PathBuf,
    /// Resolved inputs: manifest defaults, then caller overrides
    pub inputs: IndexMap<String, String>,
}

impl Template {
    /// Creates a template with every input set to its manifest default.
    pub fn new<P: AsRef<Path>>(manifest: TemplateManifest, path: P) -> Self {
        let inputs = manifest
            .inputs
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default.clone()))
            .collect();

        Self {
            manifest,
            path: path.as_ref().to_path_buf(),
            inputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Overrides a single input value.
    ///
    /// # Errors
    /// * `Error::InputError` if the manifest declares no such input, or the
    ///   value does not fit the input's type
    pub fn set_input<K: AsRef<str>, V: Into<String>>(&mut self, name: K, value: V) -> Result<()> {
        let name = name.as_ref();
        let value = value.into();
        let Some(spec) = self.manifest.inputs.get(name) else {
            let known: Vec<&str> = self.manifest.inputs.keys().map(String::as_str).collect();
            return Err(Error::InputError {
                name: name.to_string(),
                reason: format!(
                    "template '{}' does not declare it, known inputs: {}",
                    self.manifest.name,
                    known.join(", ")
                ),
            });
        };
        spec.validate(name, &value)?;

        self.inputs.insert(name.to_string(), value);
        Ok(())
    }

    /// Applies a batch of overrides, stopping at the first invalid one.
    pub fn with_inputs<I, K, V>(mut self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in overrides {
            self.set_input(name, value)?;
        }
        Ok(self)
    }

    /// Builds the render context shared by path, content and rename rendering.
    pub fn context(&self) -> serde_json::Value {
        serde_json::json!({
            "Name": self.manifest.name,
            "Input": self.inputs,
            "Path": self.path.display().to_string(),
        })
    }
}

/// Selects a template by name, returning the first match in listing order.
///
/// # Errors
/// * `Error::TemplateNotFound` listing the available names
pub fn find_template<'a>(templates: &'a [Template], name: &str) -> Result<&'a Template> {
    match templates.iter().find(|template| template.name() == name) {
        Some(template) => Ok(template),
        None => Err(Error::TemplateNotFound {
            name: name.to_string(),
            available: templates
                .iter()
                .map(Template::name)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
