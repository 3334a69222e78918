//! Upsert execution.
//!
//! Each envelope is reconciled with one `Create` call and, only when the
//! server answers `ALREADY_EXISTS`, one `Update` call. Envelopes are
//! processed strictly one after another; the first failure is recorded as a
//! failed result and stops dispatch.
//!
//! Every call gets its own deadline: the configured per-call timeout,
//! clipped to whatever is left of the run's overall timeout. A run timeout
//! too large to represent as an instant leaves the run unbounded.

use std::time::Duration;

use minder_core::{ApplyResult, Envelope};
use tokio::time::Instant;
use tonic::Code;
use tracing::{debug, info};

use crate::cancel::Cancellation;
use crate::config::ApplyConfig;
use crate::error::{ApplyError, Result};
use crate::grpc::{ControlPlane, RpcError, RpcOperation};
use crate::scheduler::DispatchPlan;

/// Results of executing a plan.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    /// One result per dispatched envelope, in dispatch order.
    pub results: Vec<ApplyResult>,

    /// The error that stopped dispatch, if any.
    pub error: Option<ApplyError>,
}

/// Dispatches envelopes to the control plane.
pub struct Executor<'a, C: ?Sized> {
    client: &'a C,
    rpc_timeout: Duration,
    total_timeout: Duration,
    deadline: Option<Instant>,
    cancellation: Cancellation,
}

impl<C: ?Sized> std::fmt::Debug for Executor<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("rpc_timeout", &self.rpc_timeout)
            .field("total_timeout", &self.total_timeout)
            .finish_non_exhaustive()
    }
}

impl<'a, C: ControlPlane + ?Sized> Executor<'a, C> {
    /// Creates an executor using the timeouts from `config`.
    #[must_use]
    pub fn new(client: &'a C, config: &ApplyConfig) -> Self {
        Self {
            client,
            rpc_timeout: config.rpc_timeout,
            total_timeout: config.total_timeout,
            deadline: None,
            cancellation: Cancellation::never(),
        }
    }

    /// Uses a run deadline that started earlier instead of starting one in
    /// [`Executor::execute`].
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Stops dispatch when `cancellation` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Executes `plan` in order.
    pub async fn execute(&self, plan: DispatchPlan) -> ExecutionOutcome {
        let deadline = self
            .deadline
            .or_else(|| run_deadline(self.total_timeout));
        let mut outcome = ExecutionOutcome {
            results: Vec::with_capacity(plan.len()),
            error: None,
        };

        for envelope in plan {
            if self.cancellation.is_cancelled() {
                outcome.error = Some(cancelled(&envelope));
                break;
            }

            match self.upsert(&envelope, deadline).await {
                Ok(result) => {
                    info!(
                        kind = %result.kind,
                        name = %result.name,
                        action = %result.action,
                        "applied resource"
                    );
                    outcome.results.push(result);
                }
                Err(error) => {
                    debug!(
                        kind = %envelope.kind(),
                        name = envelope.name(),
                        error = %error,
                        "apply failed, stopping"
                    );
                    outcome
                        .results
                        .push(ApplyResult::failed(&envelope, error.to_string()));
                    outcome.error = Some(error);
                    break;
                }
            }
        }

        outcome
    }

    async fn upsert(
        &self,
        envelope: &Envelope,
        deadline: Option<Instant>,
    ) -> Result<ApplyResult> {
        match self.call(RpcOperation::Create, envelope, deadline).await {
            Ok(id) => Ok(ApplyResult::created(envelope, id)),
            Err(e) if e.status_code() == Some(Code::AlreadyExists) => {
                debug!(
                    kind = %envelope.kind(),
                    name = envelope.name(),
                    "resource exists, updating"
                );
                let id = self.call(RpcOperation::Update, envelope, deadline).await?;
                Ok(ApplyResult::updated(envelope, id))
            }
            Err(e) => Err(e),
        }
    }

    async fn call(
        &self,
        operation: RpcOperation,
        envelope: &Envelope,
        deadline: Option<Instant>,
    ) -> Result<String> {
        let timeout = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(timed_out(operation, envelope));
                }
                self.rpc_timeout.min(remaining)
            }
            None => self.rpc_timeout,
        };

        let rpc = async {
            match operation {
                RpcOperation::Create => self.client.create(envelope, timeout).await,
                RpcOperation::Update => self.client.update(envelope, timeout).await,
            }
        };

        tokio::select! {
            () = self.cancellation.cancelled() => Err(cancelled(envelope)),
            outcome = tokio::time::timeout(timeout, rpc) => match outcome {
                Err(_) => Err(timed_out(operation, envelope)),
                Ok(Ok(id)) => Ok(id),
                Ok(Err(RpcError::Status(status))) => Err(ApplyError::Server {
                    operation,
                    kind: envelope.kind(),
                    name: envelope.name().to_string(),
                    status,
                }),
                Ok(Err(RpcError::Transport(reason))) => Err(ApplyError::Transport {
                    operation,
                    kind: envelope.kind(),
                    name: envelope.name().to_string(),
                    reason,
                }),
            },
        }
    }
}

/// The instant a run started now with `timeout` must end by, or `None` if
/// that instant is not representable.
#[must_use]
pub fn run_deadline(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

fn timed_out(operation: RpcOperation, envelope: &Envelope) -> ApplyError {
    ApplyError::Timeout {
        operation: format!("{operation} {} '{}'", envelope.kind(), envelope.name()),
    }
}

fn cancelled(envelope: &Envelope) -> ApplyError {
    ApplyError::Cancelled {
        target: format!("{} '{}'", envelope.kind(), envelope.name()),
    }
}
