//! Template manifest model.
//! Describes the `scaffold.yaml` file found at the root of every template.
//!
//! ```yaml
//! name: service
//! default:
//!   path: "{{ Input.name }}-service"
//! input:
//!   name:
//!     type: string
//!     description: Name of the service
//!     default: billing
//! files:
//!   Dockerfile:
//!     rename: "deploy/{{ OriginalFileName }}"
//! ```

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Value kinds an input may declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    String,
    Int,
}

/// A single user-overridable variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InputSpec {
    #[serde(rename = "type", default)]
    pub kind: InputKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "scalar_to_string")]
    pub default: String,
}

// `default: 8080` is as common as `default: "8080"` in hand-written manifests.
fn scalar_to_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(value) => Ok(value),
        serde_yaml::Value::Number(value) => Ok(value.to_string()),
        serde_yaml::Value::Bool(value) => Ok(value.to_string()),
        other => Err(de::Error::custom(format!("expected a scalar default, found {other:?}"))),
    }
}

impl InputSpec {
    /// Checks that `value` is acceptable for this input's kind.
    pub fn validate(&self, name: &str, value: &str) -> Result<()> {
        match self.kind {
            InputKind::String => Ok(()),
            InputKind::Int => match value.trim().parse::<i64>() {
                Ok(_) => Ok(()),
                Err(e) => Err(Error::InputError {
                    name: name.to_string(),
                    reason: format!("'{value}' is not an int: {e}"),
                }),
            },
        }
    }
}

/// Per-file rename override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenameRule {
    /// Render expression producing the final relative output path.
    /// Empty means the suffix-stripped path is kept.
    #[serde(rename = "rename", default)]
    pub expression: String,
}

impl RenameRule {
    pub fn is_empty(&self) -> bool {
        self.expression.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestDefaults {
    /// Render expression producing the default destination root
    #[serde(default)]
    pub path: String,
}

/// Parsed `scaffold.yaml`. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateManifest {
    pub name: String,
    #[serde(default)]
    pub default: ManifestDefaults,
    #[serde(rename = "input", default)]
    pub inputs: IndexMap<String, InputSpec>,
    #[serde(rename = "files", default)]
    pub file_rules: IndexMap<String, RenameRule>,
}

impl TemplateManifest {
    /// Parses manifest content. `path` is only used to annotate errors.
    ///
    /// # Errors
    /// * `Error::ManifestError` if the YAML does not match the manifest shape
    pub fn parse(content: &str, path: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| Error::ManifestError {
            path: path.to_string(),
            source,
        })
    }

    pub fn default_path_expression(&self) -> &str {
        &self.default.path
    }

    /// Returns the rename rule for a suffix-stripped relative path, if one
    /// with a non-empty expression is configured.
    pub fn rename_rule(&self, relative_path: &str) -> Option<&RenameRule> {
        self.file_rules
            .get(relative_path)
            .filter(|rule| !rule.is_empty())
    }
}
