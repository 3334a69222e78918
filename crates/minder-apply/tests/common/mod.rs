//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use minder_apply::grpc::{ControlPlane, RpcError, RpcOperation};
use minder_core::{Envelope, ResourceKind};
use serde_json::{Map, Value};
use tonic::Status;

/// Key a stored resource is addressed by.
pub type ResourceKey = (ResourceKind, Option<String>, String);

/// A call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: RpcOperation,
    pub kind: ResourceKind,
    pub name: String,
    pub project: Option<String>,
}

impl Call {
    pub fn create(kind: ResourceKind, name: &str) -> Self {
        Self {
            operation: RpcOperation::Create,
            kind,
            name: name.to_string(),
            project: None,
        }
    }

    pub fn update(kind: ResourceKind, name: &str) -> Self {
        Self {
            operation: RpcOperation::Update,
            ..Self::create(kind, name)
        }
    }
}

#[derive(Debug, Clone)]
struct Stored {
    id: String,
    document: Map<String, Value>,
}

#[derive(Debug, Default)]
struct State {
    stored: HashMap<ResourceKey, Stored>,
    calls: Vec<Call>,
    failures: HashMap<(RpcOperation, String), Status>,
}

/// In-memory control plane with create/update semantics.
#[derive(Debug, Clone, Default)]
pub struct MockControlPlane {
    state: Arc<Mutex<State>>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a resource as if it had been created earlier.
    pub fn with_existing(self, kind: ResourceKind, name: &str) -> Self {
        self.state.lock().unwrap().stored.insert(
            (kind, None, name.to_string()),
            Stored {
                id: uuid::Uuid::now_v7().to_string(),
                document: Map::new(),
            },
        );
        self
    }

    /// Makes `operation` on the resource called `name` fail with `status`.
    pub fn failing(self, operation: RpcOperation, name: &str, status: Status) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((operation, name.to_string()), status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls with the project stripped, for order assertions.
    pub fn call_names(&self) -> Vec<(RpcOperation, ResourceKind, String)> {
        self.calls()
            .into_iter()
            .map(|c| (c.operation, c.kind, c.name))
            .collect()
    }

    /// Stored documents keyed by resource.
    pub fn snapshot(&self) -> HashMap<ResourceKey, (String, Map<String, Value>)> {
        self.state
            .lock()
            .unwrap()
            .stored
            .iter()
            .map(|(k, v)| (k.clone(), (v.id.clone(), v.document.clone())))
            .collect()
    }

    fn record(&self, operation: RpcOperation, envelope: &Envelope) -> Result<ResourceKey, RpcError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call {
            operation,
            kind: envelope.kind(),
            name: envelope.name().to_string(),
            project: envelope.project().map(str::to_string),
        });
        if let Some(status) = state.failures.get(&(operation, envelope.name().to_string())) {
            return Err(RpcError::Status(status.clone()));
        }
        Ok((
            envelope.kind(),
            envelope.project().map(str::to_string),
            envelope.name().to_string(),
        ))
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn create(&self, envelope: &Envelope, _timeout: Duration) -> Result<String, RpcError> {
        let key = self.record(RpcOperation::Create, envelope)?;
        let mut state = self.state.lock().unwrap();
        if state.stored.contains_key(&key) {
            return Err(RpcError::Status(Status::already_exists(format!(
                "{} {} already exists",
                envelope.kind(),
                envelope.name()
            ))));
        }
        let id = uuid::Uuid::now_v7().to_string();
        state.stored.insert(
            key,
            Stored {
                id: id.clone(),
                document: envelope.manifest().document().clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, envelope: &Envelope, _timeout: Duration) -> Result<String, RpcError> {
        let key = self.record(RpcOperation::Update, envelope)?;
        let mut state = self.state.lock().unwrap();
        let Some(stored) = state.stored.get_mut(&key) else {
            return Err(RpcError::Status(Status::not_found("no such resource")));
        };
        stored.document = envelope.manifest().document().clone();
        Ok(stored.id.clone())
    }
}

pub fn profile(name: &str) -> String {
    format!(
        "version: v1\ntype: profile\nname: {name}\ncontext:\n  provider: github\nrepository:\n  - type: secret_scanning\n    def:\n      enabled: true\n"
    )
}

pub fn rule_type(name: &str) -> String {
    format!(
        "version: v1\ntype: rule-type\nname: {name}\ndef:\n  in_entity: repository\n  ingest:\n    type: git\n"
    )
}

pub fn data_source(name: &str) -> String {
    format!(
        r#"{{"version": "v1", "type": "data-source", "name": "{name}", "rest": {{"def": {{}}}}}}"#
    )
}

pub const NOTES: &str = "title: meeting notes\nattendees:\n  - alice\n  - bob\n";

/// Writes `contents` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

pub fn s(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn no_stdin() -> Box<dyn std::io::Read + Send> {
    Box::new(std::io::empty())
}
