//! Request/response DTOs for the RPC surface.

use serde::{Deserialize, Serialize};

use agora_store::RelayJob;
use agora_types::{Address, ContentHash, Network, TxKind};

// ── Relay intake ─────────────────────────────────────────────────────────

/// The §6 input boundary: `hash` is the envelope's content hash and the
/// dedup key; `data` is stored verbatim for the worker.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub network: Network,
    pub kind: TxKind,
    pub sender: Address,
    pub hash: ContentHash,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    /// Always true on 200: duplicate submissions are absorbed, not errors.
    pub accepted: bool,
    pub id: u64,
}

// ── Job state ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    pub network: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: u64,
    pub network: Network,
    pub kind: TxKind,
    pub sender: Address,
    pub hash: ContentHash,
    pub created_at: u64,
    pub updated_at: u64,
    pub processed: bool,
    pub failed: bool,
}

impl From<RelayJob> for JobView {
    fn from(job: RelayJob) -> Self {
        Self {
            id: job.id,
            network: job.network,
            kind: job.kind,
            sender: job.sender,
            hash: job.payload_hash,
            created_at: job.created_at.as_secs(),
            updated_at: job.updated_at.as_secs(),
            processed: job.processed,
            failed: job.failed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkDoneRequest {
    #[serde(default)]
    pub failed: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkDoneResponse {
    /// Whether this call performed the terminal transition (false when the
    /// job had already been terminated).
    pub updated: bool,
}

// ── Merkle registry ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MerkleRequestBody {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveTreeRequest {
    pub id: String,
    pub leaves: Vec<ContentHash>,
}

#[derive(Debug, Serialize)]
pub struct SaveTreeResponse {
    pub root: ContentHash,
}

#[derive(Debug, Serialize)]
pub struct BuildStatusResponse {
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<ContentHash>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub leaves: Vec<ContentHash>,
}

#[derive(Debug, Serialize)]
pub struct ProofResponse {
    pub proof: Vec<ContentHash>,
}
