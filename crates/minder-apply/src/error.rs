//! Error types for the apply pipeline.
//!
//! Every failure the pipeline can produce is an [`ApplyError`]. Each error
//! belongs to one [`ErrorCategory`], and only malformed or wrong-kind
//! documents can be skipped (and only when they came from directory
//! expansion).

use minder_core::ResourceKind;
use thiserror::Error;

use crate::grpc::{code_name, RpcOperation};

/// Result type alias for apply operations.
pub type Result<T> = std::result::Result<T, ApplyError>;

/// The error classes the apply pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad command-line input, detected before any file is read.
    ArgumentValidation,
    /// A named file or directory could not be read.
    Io,
    /// A document could not be decoded or lacks the manifest shape.
    MalformedDocument,
    /// A document is not one of the resource kinds being applied.
    WrongKind,
    /// The server rejected a call.
    ServerLogical,
    /// The call never produced a server status.
    Transport,
    /// The run was interrupted.
    Cancelled,
}

/// Errors that can occur while applying resources.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// The path arguments are unusable.
    #[error("invalid arguments: {reason}")]
    InvalidArguments {
        /// Why the arguments were rejected.
        reason: String,
    },

    /// A file could not be opened or read.
    #[error("error reading {path}: {source}")]
    Io {
        /// The path being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A directory walk failed.
    #[error("error walking {path}: {source}")]
    Walk {
        /// The directory being expanded.
        path: String,
        /// Underlying walk error.
        #[source]
        source: walkdir::Error,
    },

    /// A document could not be decoded, or is not shaped like a manifest.
    #[error("malformed document {path}: {reason}")]
    MalformedDocument {
        /// The offending input.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A document is not a resource kind this run applies.
    #[error("{path} is not a supported resource: {reason}")]
    WrongKind {
        /// The offending input.
        path: String,
        /// What was found instead.
        reason: String,
    },

    /// Two inputs describe the same resource.
    #[error("{kind} '{name}' in project '{project}' is defined in both {first} and {second}")]
    DuplicateResource {
        /// Resource kind.
        kind: ResourceKind,
        /// Resource name.
        name: String,
        /// Destination project, or `<default>`.
        project: String,
        /// First input defining it.
        first: String,
        /// Second input defining it.
        second: String,
    },

    /// The server answered a call with an error status.
    #[error("{operation} {kind} '{name}' failed: {}: {}", code_name(.status.code()), .status.message())]
    Server {
        /// The call that failed.
        operation: RpcOperation,
        /// Resource kind.
        kind: ResourceKind,
        /// Resource name.
        name: String,
        /// The status the server returned.
        status: tonic::Status,
    },

    /// The call failed before a server status could be read.
    #[error("{operation} {kind} '{name}' failed: transport error: {reason}")]
    Transport {
        /// The call that failed.
        operation: RpcOperation,
        /// Resource kind.
        kind: ResourceKind,
        /// Resource name.
        name: String,
        /// Transport failure description.
        reason: String,
    },

    /// A call did not finish within its deadline.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
    },

    /// The run was interrupted while loading inputs or during a call.
    #[error("apply cancelled while processing {target}")]
    Cancelled {
        /// What was being processed, such as `profile 'nightly'`.
        target: String,
    },
}

impl ApplyError {
    pub(crate) fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }

    /// Returns the error class.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArguments { .. } | Self::DuplicateResource { .. } => {
                ErrorCategory::ArgumentValidation
            }
            Self::Io { .. } | Self::Walk { .. } => ErrorCategory::Io,
            Self::MalformedDocument { .. } => ErrorCategory::MalformedDocument,
            Self::WrongKind { .. } => ErrorCategory::WrongKind,
            Self::Server { .. } => ErrorCategory::ServerLogical,
            Self::Transport { .. } | Self::Timeout { .. } => ErrorCategory::Transport,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
        }
    }

    /// Returns true if this error may be skipped for an expanded input.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::MalformedDocument | ErrorCategory::WrongKind
        )
    }

    /// Returns the gRPC status code if the server produced one.
    #[must_use]
    pub fn status_code(&self) -> Option<tonic::Code> {
        match self {
            Self::Server { status, .. } => Some(status.code()),
            _ => None,
        }
    }
}
