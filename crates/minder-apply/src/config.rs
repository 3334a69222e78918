//! Configuration for the apply pipeline.

use std::time::Duration;

use minder_core::ResourceKind;

/// Configuration for an apply run.
#[derive(Debug, Clone)]
pub struct ApplyConfig {
    /// Deadline for each individual Create or Update call.
    pub rpc_timeout: Duration,

    /// Upper bound for the whole run; per-call deadlines never extend past it.
    pub total_timeout: Duration,

    /// Project that overrides whatever the documents declare.
    pub project: Option<String>,

    /// Resource kinds this run applies; other kinds are wrong-kind documents.
    pub accepted_kinds: Vec<ResourceKind>,

    /// Whether `-` may be used to read a document from standard input.
    pub allow_stdin: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(300),
            project: None,
            accepted_kinds: ResourceKind::ALL.to_vec(),
            allow_stdin: true,
        }
    }
}

impl ApplyConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> ApplyConfigBuilder {
        ApplyConfigBuilder::default()
    }

    /// Returns true if documents of `kind` are applied by this run.
    #[must_use]
    pub fn accepts(&self, kind: ResourceKind) -> bool {
        self.accepted_kinds.contains(&kind)
    }
}

/// Builder for `ApplyConfig`.
#[derive(Debug, Default)]
pub struct ApplyConfigBuilder {
    rpc_timeout: Option<Duration>,
    total_timeout: Option<Duration>,
    project: Option<String>,
    accepted_kinds: Option<Vec<ResourceKind>>,
    allow_stdin: Option<bool>,
}

impl ApplyConfigBuilder {
    /// Sets the per-call timeout.
    #[must_use]
    pub const fn rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    /// Sets the timeout for the whole run.
    #[must_use]
    pub const fn total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = Some(timeout);
        self
    }

    /// Sets the project override.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Restricts the run to a single resource kind.
    #[must_use]
    pub fn only(mut self, kind: ResourceKind) -> Self {
        self.accepted_kinds = Some(vec![kind]);
        self
    }

    /// Sets the accepted resource kinds.
    #[must_use]
    pub fn accepted_kinds(mut self, kinds: Vec<ResourceKind>) -> Self {
        self.accepted_kinds = Some(kinds);
        self
    }

    /// Allows or forbids reading from standard input.
    #[must_use]
    pub const fn allow_stdin(mut self, allow: bool) -> Self {
        self.allow_stdin = Some(allow);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ApplyConfig {
        let defaults = ApplyConfig::default();
        ApplyConfig {
            rpc_timeout: self.rpc_timeout.unwrap_or(defaults.rpc_timeout),
            total_timeout: self.total_timeout.unwrap_or(defaults.total_timeout),
            project: self.project.or(defaults.project),
            accepted_kinds: self.accepted_kinds.unwrap_or(defaults.accepted_kinds),
            allow_stdin: self.allow_stdin.unwrap_or(defaults.allow_stdin),
        }
    }
}
