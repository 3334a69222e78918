//! The end-to-end apply pipeline.
//!
//! ```text
//! paths ─► PathExpander ─► DocumentLoader ─► Classifier ─► DispatchPlan ─► Executor
//! ```
//!
//! Malformed and wrong-kind documents found through directory expansion are
//! skipped and reported; the same problems in an explicitly named input stop
//! the run before any call is made.

use std::fmt;
use std::io::Read;

use minder_core::{ApplyResult, FileArg};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

use crate::cancel::Cancellation;
use crate::classifier::Classifier;
use crate::config::ApplyConfig;
use crate::error::{ApplyError, Result};
use crate::executor::{run_deadline, Executor};
use crate::expander::PathExpander;
use crate::grpc::ControlPlane;
use crate::loader::DocumentLoader;
use crate::scheduler::DispatchPlan;

/// An expanded input that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path of the skipped input.
    pub path: String,
    /// Why it was skipped.
    pub reason: String,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipping file {}: {}", self.path, self.reason)
    }
}

/// Everything an apply run produced.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Per-resource results in dispatch order.
    pub results: Vec<ApplyResult>,

    /// Expanded inputs that were skipped, in input order.
    pub skipped: Vec<SkippedFile>,

    /// The fatal error that ended the run, if any.
    pub error: Option<ApplyError>,
}

impl ApplyReport {
    fn failed(skipped: Vec<SkippedFile>, error: ApplyError) -> Self {
        Self {
            results: Vec::new(),
            skipped,
            error: Some(error),
        }
    }

    /// True if no fatal error occurred.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs the apply stages against a control plane.
pub struct Pipeline<C> {
    client: C,
    config: ApplyConfig,
    cancellation: Cancellation,
}

impl<C> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: ControlPlane> Pipeline<C> {
    /// Creates a pipeline.
    pub fn new(client: C, config: ApplyConfig) -> Self {
        Self {
            client,
            config,
            cancellation: Cancellation::never(),
        }
    }

    /// Stops dispatch when `cancellation` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ApplyConfig {
        &self.config
    }

    /// Applies the resources found under `paths`.
    ///
    /// `stdin` is read only if `paths` is exactly `["-"]`. The run's overall
    /// timeout and cancellation cover loading as well as dispatch.
    pub async fn run<S: AsRef<str>>(
        &self,
        paths: &[S],
        stdin: Box<dyn Read + Send>,
    ) -> ApplyReport {
        let deadline = run_deadline(self.config.total_timeout);
        let args = match PathExpander::new()
            .with_stdin(self.config.allow_stdin)
            .expand(paths)
        {
            Ok(args) => args,
            Err(error) => return ApplyReport::failed(Vec::new(), error),
        };

        let (plan, skipped) = match self.load(args, stdin, deadline).await {
            (Ok(plan), skipped) => (plan, skipped),
            (Err(error), skipped) => return ApplyReport::failed(skipped, error),
        };
        debug!(
            resources = plan.len(),
            skipped = skipped.len(),
            "dispatch plan ready"
        );

        let outcome = Executor::new(&self.client, &self.config)
            .with_cancellation(self.cancellation.clone())
            .with_deadline(deadline)
            .execute(plan)
            .await;

        ApplyReport {
            results: outcome.results,
            skipped,
            error: outcome.error,
        }
    }

    /// Loads and classifies every input on a dedicated thread.
    ///
    /// The thread is raced against cancellation and the run deadline; one
    /// that loses the race is left to finish on its own.
    async fn load(
        &self,
        args: Vec<FileArg>,
        stdin: Box<dyn Read + Send>,
        deadline: Option<Instant>,
    ) -> Prepared {
        if self.cancellation.is_cancelled() {
            return (Err(load_cancelled()), Vec::new());
        }

        let classifier = Classifier::from_config(&self.config);
        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("minder-load".to_string())
            .spawn(move || {
                let _ = tx.send(prepare(args, stdin, &classifier));
            });
        if let Err(source) = spawned {
            return (Err(load_failed(source)), Vec::new());
        }

        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => (Err(load_cancelled()), Vec::new()),
            () = expired => (
                Err(ApplyError::Timeout {
                    operation: "loading input documents".to_string(),
                }),
                Vec::new(),
            ),
            prepared = rx => prepared.unwrap_or_else(|_| {
                let source = std::io::Error::other("input loading stopped unexpectedly");
                (Err(load_failed(source)), Vec::new())
            }),
        }
    }
}

type Prepared = (Result<DispatchPlan>, Vec<SkippedFile>);

fn prepare(args: Vec<FileArg>, stdin: Box<dyn Read + Send>, classifier: &Classifier) -> Prepared {
    let mut loader = DocumentLoader::new(stdin);
    let mut envelopes = Vec::with_capacity(args.len());
    let mut skipped = Vec::new();

    for arg in args {
        let classified = loader
            .load(&arg)
            .and_then(|document| classifier.classify(document, arg.clone()));

        match classified {
            Ok(envelope) => envelopes.push(envelope),
            Err(error) if arg.is_expanded() && error.is_skippable() => {
                debug!(path = arg.path(), error = %error, "skipping file");
                skipped.push(SkippedFile {
                    path: arg.path().to_string(),
                    reason: skip_reason(&error),
                });
            }
            Err(error) => return (Err(error), skipped),
        }
    }

    (DispatchPlan::new(envelopes), skipped)
}

fn load_cancelled() -> ApplyError {
    ApplyError::Cancelled {
        target: "input documents".to_string(),
    }
}

fn load_failed(source: std::io::Error) -> ApplyError {
    ApplyError::Io {
        path: "<input>".to_string(),
        source,
    }
}

fn skip_reason(error: &ApplyError) -> String {
    match error {
        ApplyError::MalformedDocument { reason, .. } | ApplyError::WrongKind { reason, .. } => {
            reason.clone()
        }
        other => other.to_string(),
    }
}
