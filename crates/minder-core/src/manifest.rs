//! Decoded resource manifests.
//!
//! A [`Manifest`] is a decoded YAML/JSON document whose shape has been
//! checked just enough to address it: it is a mapping, it has a string
//! `type` discriminator, a non-empty `name`, and an optional `context`
//! mapping. Every other field is kept verbatim and forwarded to the control
//! plane, which remains the schema authority.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The `context` block of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestContext {
    /// Project identifier the resource belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Provider the resource is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// A decoded resource manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    type_tag: String,
    name: String,
    version: Option<String>,
    context: ManifestContext,
    document: Map<String, Value>,
}

impl Manifest {
    /// Checks the shape of a decoded document and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedManifest`] if the document is not a mapping,
    /// lacks a string `type`, lacks a non-empty string `name`, or carries a
    /// `context` that is not a mapping of strings.
    pub fn from_document(document: Value) -> Result<Self> {
        let Value::Object(document) = document else {
            return Err(Error::malformed(format!(
                "expected a mapping at the top level, found {}",
                value_kind(&document)
            )));
        };

        let type_tag = match document.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(other) => {
                return Err(Error::malformed(format!(
                    "field 'type' must be a string, found {}",
                    value_kind(other)
                )))
            }
            None => return Err(Error::malformed("missing field 'type'")),
        };

        let name = match document.get("name") {
            Some(Value::String(n)) if !n.trim().is_empty() => n.clone(),
            Some(Value::String(_)) => return Err(Error::malformed("field 'name' is empty")),
            Some(other) => {
                return Err(Error::malformed(format!(
                    "field 'name' must be a string, found {}",
                    value_kind(other)
                )))
            }
            None => return Err(Error::malformed("missing field 'name'")),
        };

        let version = match document.get("version") {
            Some(Value::String(v)) => Some(v.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let context = match document.get("context") {
            None | Some(Value::Null) => ManifestContext::default(),
            Some(ctx @ Value::Object(_)) => serde_json::from_value(ctx.clone())
                .map_err(|e| Error::malformed(format!("invalid 'context': {e}")))?,
            Some(other) => {
                return Err(Error::malformed(format!(
                    "field 'context' must be a mapping, found {}",
                    value_kind(other)
                )))
            }
        };

        Ok(Self {
            type_tag,
            name,
            version,
            context,
            document,
        })
    }

    /// The raw `type` discriminator as written in the document.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The manifest schema version, if declared.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The declared context.
    #[must_use]
    pub const fn context(&self) -> &ManifestContext {
        &self.context
    }

    /// The project the resource targets, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.context.project.as_deref()
    }

    /// The full document, including fields this crate does not interpret.
    #[must_use]
    pub const fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Overrides the project in both the parsed context and the document.
    pub fn set_project(&mut self, project: impl Into<String>) {
        let project = project.into();

        let context = self
            .document
            .entry("context")
            .or_insert_with(|| Value::Object(Map::new()));
        if !context.is_object() {
            *context = Value::Object(Map::new());
        }
        if let Value::Object(ctx) = context {
            ctx.insert("project".to_string(), Value::String(project.clone()));
        }

        self.context.project = Some(project);
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
