//! Per-resource apply outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resource::{Envelope, ResourceKind};

/// What happened to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    /// The resource did not exist and was created.
    Created,
    /// The resource existed and was updated.
    Updated,
    /// The input was not dispatched.
    Skipped,
    /// The server call failed.
    Failed,
}

impl fmt::Display for ApplyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The outcome of reconciling one envelope against the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Path of the input the resource came from.
    pub source_path: String,

    /// Resource kind.
    pub kind: ResourceKind,

    /// Resource name.
    pub name: String,

    /// Destination project, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Identifier assigned by the server after a successful call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,

    /// What happened.
    pub action: ApplyAction,

    /// Error message for failed resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApplyResult {
    fn from_envelope(envelope: &Envelope, action: ApplyAction) -> Self {
        Self {
            source_path: envelope.source().path().to_string(),
            kind: envelope.kind(),
            name: envelope.name().to_string(),
            project: envelope.project().map(str::to_string),
            server_id: None,
            action,
            error: None,
        }
    }

    /// A result for a resource the server created.
    #[must_use]
    pub fn created(envelope: &Envelope, server_id: impl Into<String>) -> Self {
        Self {
            server_id: Some(server_id.into()),
            ..Self::from_envelope(envelope, ApplyAction::Created)
        }
    }

    /// A result for a resource the server updated.
    #[must_use]
    pub fn updated(envelope: &Envelope, server_id: impl Into<String>) -> Self {
        Self {
            server_id: Some(server_id.into()),
            ..Self::from_envelope(envelope, ApplyAction::Updated)
        }
    }

    /// A result for a resource whose server call failed.
    #[must_use]
    pub fn failed(envelope: &Envelope, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_envelope(envelope, ApplyAction::Failed)
        }
    }

    /// True if the resource now exists on the server as written.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.action, ApplyAction::Created | ApplyAction::Updated)
    }
}
