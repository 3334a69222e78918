//! Channel setup for the control plane.

use std::time::Duration;

use anyhow::{Context, Result};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::debug;

use crate::config::ClientConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the channel for a run.
///
/// The connection is established on first use, so an unreachable server
/// surfaces as a transport error on the first call.
pub fn connect(config: &ClientConfig) -> Result<Channel> {
    let uri = config.grpc_server.to_uri();
    let mut endpoint = Endpoint::from_shared(uri.clone())
        .with_context(|| format!("Invalid server address '{uri}'"))?
        .connect_timeout(CONNECT_TIMEOUT);

    if !config.grpc_server.insecure {
        endpoint = endpoint
            .tls_config(ClientTlsConfig::new().with_native_roots())
            .context("Failed to configure TLS")?;
    }

    debug!(uri = %uri, "connecting to control plane");
    Ok(endpoint.connect_lazy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GrpcServerConfig;

    #[tokio::test]
    async fn test_connect_is_lazy() {
        let config = ClientConfig {
            grpc_server: GrpcServerConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                insecure: true,
            },
            ..Default::default()
        };
        assert!(connect(&config).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_host_is_rejected() {
        let config = ClientConfig {
            grpc_server: GrpcServerConfig {
                host: "bad host".to_string(),
                port: 443,
                insecure: true,
            },
            ..Default::default()
        };
        assert!(connect(&config).is_err());
    }
}
