//! Client configuration and credential lookup.
//!
//! Settings are layered: built-in defaults, then the YAML config file, then
//! environment variables and flags (clap resolves those two).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::commands::GlobalArgs;

const CONFIG_FILE: &str = "config.yaml";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Address of the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcServerConfig {
    /// Host name or address.
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Disable TLS.
    pub insecure: bool,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            host: "api.stacklok.com".to_string(),
            port: 443,
            insecure: false,
        }
    }
}

impl GrpcServerConfig {
    /// Returns the server as a URI string.
    pub fn to_uri(&self) -> String {
        let scheme = if self.insecure { "http" } else { "https" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Configuration for talking to the control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address.
    pub grpc_server: GrpcServerConfig,

    /// Default project for commands that take one.
    pub project: Option<String>,
}

impl ClientConfig {
    /// Loads the configuration for a run.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match config_dir().map(|dir| dir.join(CONFIG_FILE)) {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Applies environment and flag overrides.
    #[must_use]
    pub fn with_overrides(mut self, global: &GlobalArgs) -> Self {
        if let Some(host) = &global.grpc_host {
            self.grpc_server.host.clone_from(host);
        }
        if let Some(port) = global.grpc_port {
            self.grpc_server.port = port;
        }
        if let Some(insecure) = global.grpc_insecure {
            self.grpc_server.insecure = insecure;
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    access_token: String,
}

/// Directory holding the client's configuration and credentials.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("minder"))
}

/// Resolves the access token: an explicit token wins over the stored one.
pub fn resolve_token(explicit: Option<&str>) -> Result<Option<String>> {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Ok(Some(token.to_string()));
    }
    match config_dir() {
        Some(dir) => read_credentials(&dir.join(CREDENTIALS_FILE)),
        None => Ok(None),
    }
}

/// Reads the stored access token, if any.
pub fn read_credentials(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials {}", path.display()))?;
    let credentials: Credentials = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse credentials {}", path.display()))?;
    Ok(Some(credentials.access_token).filter(|t| !t.is_empty()))
}
