//! Error types for Minder core operations.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building the core model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A file argument violated its invariants.
    #[error("Invalid file argument: {reason}")]
    InvalidFileArg {
        /// Why the argument was rejected.
        reason: String,
    },

    /// A decoded document does not have the shape of a resource manifest.
    #[error("Malformed manifest: {reason}")]
    MalformedManifest {
        /// What is wrong with the document.
        reason: String,
    },

    /// The document's `type` field names no known resource kind.
    #[error("Unknown resource type '{value}'")]
    UnknownKind {
        /// The discriminator value as written in the document.
        value: String,
    },
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedManifest {
            reason: reason.into(),
        }
    }
}
