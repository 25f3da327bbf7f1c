//! The relay service: a persistent, at-least-once delivery pipeline.
//!
//! Producers submit signed envelopes over the RPC boundary; the service
//! deduplicates them by content hash and stores pending work. A background
//! worker drains each network's queue, submits transactions with the
//! relayer's own key, and records outcomes. A time-based staleness sweep
//! bounds the pending set even if the worker or the target chain is down.

pub mod chain;
pub mod config;
pub mod error;
pub mod http_chain;
pub mod metrics;
pub mod service;
pub mod worker;

pub use chain::{ChainClient, RelayerInfo, SubmissionError, TxReceipt};
pub use config::{NetworkConfig, RelayerConfig};
pub use error::RelayError;
pub use http_chain::{HttpAttestationClient, HttpChainClient};
pub use metrics::RelayerMetrics;
pub use service::{RelayService, STALE_AFTER_SECS};
pub use worker::{run_sweeper, AttestationClient, ProposalWorker, RelayWorker};
