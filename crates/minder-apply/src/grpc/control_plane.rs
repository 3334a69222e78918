//! The control-plane seam.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use minder_core::Envelope;
use tonic::{Code, Status};

/// The two calls the upsert protocol makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcOperation {
    /// Create a resource.
    Create,
    /// Update an existing resource.
    Update,
}

impl fmt::Display for RpcOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Failure of a single call.
#[derive(Debug)]
pub enum RpcError {
    /// The server answered with an error status.
    Status(Status),
    /// No server status could be obtained.
    Transport(String),
}

impl RpcError {
    /// Classifies a status returned by tonic.
    ///
    /// Tonic reports connection and protocol faults as a `Status` that
    /// carries the local error as its source; statuses decoded from a
    /// server response have none.
    #[must_use]
    pub fn from_status(status: Status) -> Self {
        match std::error::Error::source(&status) {
            Some(source) => Self::Transport(format!("{}: {source}", status.message())),
            None => Self::Status(status),
        }
    }

    /// True if the server reported that the resource already exists.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Status(status) if status.code() == Code::AlreadyExists)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => {
                write!(f, "{}: {}", code_name(status.code()), status.message())
            }
            Self::Transport(reason) => write!(f, "transport error: {reason}"),
        }
    }
}

impl std::error::Error for RpcError {}

/// The calls the apply pipeline makes against the control plane.
///
/// Each call returns the identifier the server assigned to the resource.
/// `timeout` is the deadline the server should honor for this call.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Creates the resource described by `envelope`.
    async fn create(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError>;

    /// Updates the resource described by `envelope`.
    async fn update(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError>;
}

#[async_trait]
impl<T: ControlPlane + ?Sized> ControlPlane for std::sync::Arc<T> {
    async fn create(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError> {
        (**self).create(envelope, timeout).await
    }

    async fn update(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError> {
        (**self).update(envelope, timeout).await
    }
}

/// The canonical upper-case name of a gRPC status code.
#[must_use]
pub const fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_already_exists_triggers_update() {
        assert!(RpcError::Status(Status::already_exists("dup")).is_already_exists());

        for status in [
            Status::invalid_argument("x"),
            Status::not_found("x"),
            Status::permission_denied("x"),
            Status::unavailable("x"),
        ] {
            assert!(!RpcError::Status(status).is_already_exists());
        }
        assert!(!RpcError::Transport("reset".to_string()).is_already_exists());
    }

    #[test]
    fn test_server_status_is_not_transport() {
        let err = RpcError::from_status(Status::already_exists("dup"));
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_status_with_source_is_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let status = Status::from_error(Box::new(io));
        assert!(matches!(RpcError::from_status(status), RpcError::Transport(_)));
    }

    #[test]
    fn test_display() {
        let err = RpcError::Status(Status::permission_denied("no access"));
        assert_eq!(err.to_string(), "PERMISSION_DENIED: no access");
        assert_eq!(code_name(Code::AlreadyExists), "ALREADY_EXISTS");
    }
}
