//! # Minder Apply
//!
//! The resource apply pipeline for the Minder control plane.
//!
//! `apply` takes declarative manifests (profiles, rule types, data sources)
//! from files, directories or standard input and reconciles each one with
//! the control plane: create it, or update it if it already exists.
//!
//! The stages run strictly in order and only the last one talks to the
//! network:
//!
//! 1. [`expander`] turns path arguments into concrete inputs
//! 2. [`loader`] decodes each input as YAML or JSON
//! 3. [`classifier`] decides the resource kind and applies the project override
//! 4. [`scheduler`] orders data sources, then rule types, then profiles
//! 5. [`executor`] runs Create, falling back to Update on `ALREADY_EXISTS`
//!
//! [`Pipeline`] wires the stages together.
//!
//! ## Example
//!
//! ```rust,ignore
//! use minder_apply::{ApplyConfig, Pipeline};
//! use minder_apply::grpc::GrpcControlPlane;
//!
//! let client = GrpcControlPlane::new(channel);
//! let pipeline = Pipeline::new(client, ApplyConfig::builder().project("my-project").build());
//! let report = pipeline.run(&["policies/"], Box::new(std::io::stdin())).await;
//!
//! for skipped in &report.skipped {
//!     eprintln!("{skipped}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod classifier;
pub mod config;
pub mod error;
pub mod executor;
pub mod expander;
pub mod grpc;
pub mod loader;
pub mod pipeline;
pub mod scheduler;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use classifier::Classifier;
pub use config::{ApplyConfig, ApplyConfigBuilder};
pub use error::{ApplyError, ErrorCategory, Result};
pub use executor::{ExecutionOutcome, Executor};
pub use expander::PathExpander;
pub use loader::{decode_document, DocumentLoader};
pub use pipeline::{ApplyReport, Pipeline, SkippedFile};
pub use scheduler::DispatchPlan;
