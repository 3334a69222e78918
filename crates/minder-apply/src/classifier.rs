//! Resource classification.
//!
//! Decides which resource kind a decoded document is, checks its manifest
//! shape, and applies the project override. The kind comes from the
//! document's `type` field, matched case-insensitively.

use minder_core::{Envelope, FileArg, Manifest, ResourceKind};
use serde_json::Value;

use crate::config::ApplyConfig;
use crate::error::{ApplyError, Result};

/// Turns decoded documents into envelopes.
#[derive(Debug, Clone)]
pub struct Classifier {
    accepted: Vec<ResourceKind>,
    project: Option<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            accepted: ResourceKind::ALL.to_vec(),
            project: None,
        }
    }
}

impl Classifier {
    /// Creates a classifier accepting every kind, with no project override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier from an apply configuration.
    #[must_use]
    pub fn from_config(config: &ApplyConfig) -> Self {
        Self {
            accepted: config.accepted_kinds.clone(),
            project: config.project.clone(),
        }
    }

    /// Restricts the accepted kinds.
    #[must_use]
    pub fn with_accepted(mut self, kinds: Vec<ResourceKind>) -> Self {
        self.accepted = kinds;
        self
    }

    /// Sets the project that overrides the documents' own.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Classifies one document.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::WrongKind`] if the document has no usable
    /// `type`, names an unknown kind, or names a kind this classifier does
    /// not accept. Returns [`ApplyError::MalformedDocument`] if the document
    /// is not a mapping or fails the manifest shape checks.
    pub fn classify(&self, document: Value, source: FileArg) -> Result<Envelope> {
        let kind = self.kind_of(&document, &source)?;

        let mut manifest =
            Manifest::from_document(document).map_err(|e| ApplyError::MalformedDocument {
                path: source.path().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(project) = &self.project {
            manifest.set_project(project.clone());
        }

        Ok(Envelope::new(kind, manifest, source))
    }

    fn kind_of(&self, document: &Value, source: &FileArg) -> Result<ResourceKind> {
        let wrong_kind = |reason: String| ApplyError::WrongKind {
            path: source.path().to_string(),
            reason,
        };

        let Value::Object(fields) = document else {
            return Err(ApplyError::MalformedDocument {
                path: source.path().to_string(),
                reason: "expected a mapping at the top level".to_string(),
            });
        };

        let tag = match fields.get("type") {
            Some(Value::String(tag)) => tag,
            Some(_) => return Err(wrong_kind("field 'type' is not a string".to_string())),
            None => return Err(wrong_kind("document has no 'type' field".to_string())),
        };

        let kind: ResourceKind = tag
            .parse()
            .map_err(|e: minder_core::Error| wrong_kind(e.to_string()))?;

        if !self.accepted.contains(&kind) {
            let expected: Vec<&str> = self.accepted.iter().map(|k| k.as_str()).collect();
            return Err(wrong_kind(format!(
                "expected {}, found {kind}",
                expected.join(" or ")
            )));
        }

        Ok(kind)
    }
}
