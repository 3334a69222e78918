//! gRPC access to the Minder control plane.
//!
//! - [`ControlPlane`]: the seam the executor calls through
//! - [`GrpcControlPlane`]: the tonic implementation over a shared channel
//! - [`types`]: wire messages, declared with `prost` derives
//!
//! # Example
//!
//! ```rust,ignore
//! use tonic::transport::Endpoint;
//! use minder_apply::grpc::GrpcControlPlane;
//!
//! let channel = Endpoint::from_static("https://api.example.com").connect_lazy();
//! let client = GrpcControlPlane::new(channel).with_bearer_token("token")?;
//! ```

mod client;
mod control_plane;
pub mod types;

pub use client::{method_path, GrpcControlPlane};
pub use control_plane::{code_name, ControlPlane, RpcError, RpcOperation};
