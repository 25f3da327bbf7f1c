//! The chain submission boundary.
//!
//! The relay worker drives jobs through this trait; implementations wrap a
//! per-chain RPC provider. Gas/fee strategy is the implementation's
//! concern — the relayer's key pays on this path, not the original
//! submitter.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use agora_store::RelayJob;
use agora_types::Address;

/// Why a submission attempt did not land, split by retryability. The worker
/// leaves `Transient` failures pending for the next poll and terminates
/// `Permanent` ones immediately.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// RPC hiccup, underpriced gas, nonce race: retry next poll cycle.
    #[error("transient submission failure: {0}")]
    Transient(String),

    /// The chain rejected the payload as invalid; retrying cannot help.
    #[error("payload rejected by chain: {0}")]
    Permanent(String),
}

/// Receipt for a landed transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_id: String,
}

/// Liquidity report for one network's relayer account, consumed by the
/// route resolver on the client side.
#[derive(Clone, Debug, Serialize)]
pub struct RelayerInfo {
    pub address: Address,
    pub has_minimum_balance: bool,
}

/// Per-network chain access used by the worker.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Build and submit the native transaction for a stored job, signed by
    /// the relayer's key.
    async fn submit(&self, job: &RelayJob) -> Result<TxReceipt, SubmissionError>;

    /// The relayer account and whether it holds the configured minimum
    /// balance.
    async fn relayer_info(&self) -> Result<RelayerInfo, SubmissionError>;

    /// The chain's current head position (block number or snapshot id),
    /// used as the eligibility ceiling for snapshot-gated proposals.
    async fn head(&self) -> Result<u64, SubmissionError>;
}
