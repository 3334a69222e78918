//! # Minder Core
//!
//! Core types for the Minder apply client.
//!
//! This crate holds the in-memory model that flows through the apply
//! pipeline, from the user's path arguments to the per-resource outcomes:
//!
//! - [`FileArg`] - one concrete input, explicit or produced by directory expansion
//! - [`ResourceKind`] - the closed set of resource variants the control plane accepts
//! - [`Manifest`] - a decoded document with its shape checked and unknown fields kept
//! - [`Envelope`] - a classified manifest plus its provenance
//! - [`ApplyResult`] - the outcome of reconciling one envelope
//!
//! Nothing in here performs I/O; loading and network calls live in
//! `minder-apply`.
//!
//! ## Example
//!
//! ```rust
//! use minder_core::{Envelope, FileArg, Manifest, ResourceKind};
//! use serde_json::json;
//!
//! let manifest = Manifest::from_document(json!({
//!     "version": "v1",
//!     "type": "profile",
//!     "name": "nightly",
//! }))?;
//! let kind: ResourceKind = manifest.type_tag().parse()?;
//! let envelope = Envelope::new(kind, manifest, FileArg::explicit("p.yaml")?);
//!
//! assert_eq!(envelope.kind(), ResourceKind::Profile);
//! assert_eq!(envelope.name(), "nightly");
//! # Ok::<(), minder_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod file_arg;
pub mod manifest;
pub mod resource;
pub mod result;


pub use error::{Error, Result};
pub use file_arg::{FileArg, STDIN_PATH};
pub use manifest::{Manifest, ManifestContext};
pub use resource::{Envelope, ResourceKind};
pub use result::{ApplyAction, ApplyResult};
