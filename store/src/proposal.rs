//! Cross-chain proposal relay storage trait.
//!
//! Proposals whose execution depends on a follow-up cross-chain step (a
//! timestamp attestation, a storage-proof snapshot) are tracked here and
//! drained by the worker's polling loop once their external condition holds.

use serde::{Deserialize, Serialize};

use agora_types::{Address, ChainId, Timestamp};

use crate::StoreError;

/// A registered proposal awaiting a cross-chain attestation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalRelayRecord {
    /// Proposal content id (space-scoped, caller-chosen).
    pub id: String,
    pub chain_id: ChainId,
    pub timestamp: Timestamp,
    pub strategy_address: Address,
    /// External linkage id for the in-flight attestation, set once the
    /// attestation provider accepts the request.
    #[serde(default)]
    pub attestation_id: Option<String>,
    pub processed: bool,
}

/// A queued snapshot-gated proposal on the network-scoped secondary queue.
///
/// Eligible for processing only once the external chain has advanced past
/// `snapshot` — the poll carries a caller-supplied ceiling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRelayRecord {
    pub chain_id: ChainId,
    pub view_id: u64,
    pub snapshot: u64,
    #[serde(default)]
    pub attestation_id: Option<String>,
    pub processed: bool,
}

pub trait ProposalRelayStore {
    /// Register a proposal needing a cross-chain follow-up.
    fn register_proposal(&self, record: &ProposalRelayRecord) -> Result<(), StoreError>;

    /// Record the external attestation id once the provider accepts it.
    fn set_attestation(&self, id: &str, attestation_id: &str) -> Result<(), StoreError>;

    /// Fetch one registered proposal.
    fn proposal(&self, id: &str) -> Result<Option<ProposalRelayRecord>, StoreError>;

    /// All unprocessed proposals, ordered by id.
    fn proposals_to_process(&self) -> Result<Vec<ProposalRelayRecord>, StoreError>;

    /// Mark a proposal's follow-up as complete.
    fn mark_proposal_processed(&self, id: &str) -> Result<(), StoreError>;

    /// Insert-if-absent on `(chain_id, view_id)`.
    fn enqueue_snapshot(&self, record: &SnapshotRelayRecord) -> Result<(), StoreError>;

    /// Unprocessed snapshot records for `chain_id` whose `snapshot` is at
    /// most `max_snapshot`.
    fn snapshots_to_process(
        &self,
        chain_id: ChainId,
        max_snapshot: u64,
    ) -> Result<Vec<SnapshotRelayRecord>, StoreError>;

    /// Mark a snapshot record processed.
    fn mark_snapshot_processed(&self, chain_id: ChainId, view_id: u64)
        -> Result<(), StoreError>;
}
