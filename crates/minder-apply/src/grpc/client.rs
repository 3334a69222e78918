//! Tonic client for the resource services.

use std::time::Duration;

use async_trait::async_trait;
use minder_core::{Envelope, ResourceKind};
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::errors::InvalidMetadataValue;
use tonic::metadata::{AsciiMetadataValue, MetadataValue};
use tonic::transport::Channel;
use tonic::Request;
use tracing::{debug, instrument};

use super::control_plane::{ControlPlane, RpcError, RpcOperation};
use super::types::{Resource, UpsertRequest, UpsertResponse};

/// The largest timeout the `grpc-timeout` header can carry.
const MAX_GRPC_TIMEOUT: Duration = Duration::from_secs(99_999_999 * 3600);

/// The fully-qualified gRPC method for an operation on a kind.
#[must_use]
pub const fn method_path(kind: ResourceKind, operation: RpcOperation) -> &'static str {
    match (kind, operation) {
        (ResourceKind::Profile, RpcOperation::Create) => "/minder.v1.ProfileService/CreateProfile",
        (ResourceKind::Profile, RpcOperation::Update) => "/minder.v1.ProfileService/UpdateProfile",
        (ResourceKind::RuleType, RpcOperation::Create) => {
            "/minder.v1.RuleTypeService/CreateRuleType"
        }
        (ResourceKind::RuleType, RpcOperation::Update) => {
            "/minder.v1.RuleTypeService/UpdateRuleType"
        }
        (ResourceKind::DataSource, RpcOperation::Create) => {
            "/minder.v1.DataSourceService/CreateDataSource"
        }
        (ResourceKind::DataSource, RpcOperation::Update) => {
            "/minder.v1.DataSourceService/UpdateDataSource"
        }
    }
}

/// [`ControlPlane`] over a tonic channel.
///
/// The channel is owned by the caller; cloning it per call is cheap and
/// shares the underlying connection.
#[derive(Debug, Clone)]
pub struct GrpcControlPlane {
    channel: Channel,
    authorization: Option<AsciiMetadataValue>,
}

impl GrpcControlPlane {
    /// Creates a client over `channel`.
    #[must_use]
    pub const fn new(channel: Channel) -> Self {
        Self {
            channel,
            authorization: None,
        }
    }

    /// Sends `token` as a bearer credential on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not valid header text.
    pub fn with_bearer_token(mut self, token: &str) -> Result<Self, InvalidMetadataValue> {
        let value: AsciiMetadataValue = MetadataValue::try_from(format!("Bearer {token}"))?;
        self.authorization = Some(value);
        Ok(self)
    }

    async fn call(
        &self,
        operation: RpcOperation,
        envelope: &Envelope,
        timeout: Duration,
    ) -> Result<String, RpcError> {
        let path = method_path(envelope.kind(), operation);

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| RpcError::Transport(format!("service was not ready: {e}")))?;

        let mut request = Request::new(UpsertRequest {
            resource: Some(Resource::from(envelope)),
        });
        request.set_timeout(timeout.min(MAX_GRPC_TIMEOUT));
        if let Some(authorization) = &self.authorization {
            request
                .metadata_mut()
                .insert("authorization", authorization.clone());
        }

        let codec: ProstCodec<UpsertRequest, UpsertResponse> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
            .map_err(RpcError::from_status)?;

        let id = resource_id(response.into_inner())?;
        debug!(path, id = %id, "call succeeded");
        Ok(id)
    }
}

/// The server-assigned identifier in a successful response.
fn resource_id(response: UpsertResponse) -> Result<String, RpcError> {
    response
        .resource
        .and_then(|r| r.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RpcError::Transport("response carried no resource id".to_string()))
}

#[async_trait]
impl ControlPlane for GrpcControlPlane {
    #[instrument(skip(self, envelope), fields(kind = %envelope.kind(), name = envelope.name()))]
    async fn create(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError> {
        self.call(RpcOperation::Create, envelope, timeout).await
    }

    #[instrument(skip(self, envelope), fields(kind = %envelope.kind(), name = envelope.name()))]
    async fn update(&self, envelope: &Envelope, timeout: Duration) -> Result<String, RpcError> {
        self.call(RpcOperation::Update, envelope, timeout).await
    }
}
