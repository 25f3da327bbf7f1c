//! HTTP boundary of the relay service.
//!
//! Exposes the relay intake and job-state endpoints, the merkle registry,
//! the per-network relayer liquidity report, and Prometheus metrics.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{AppState, RpcServer};
