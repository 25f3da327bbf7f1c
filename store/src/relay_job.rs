//! Relay job storage trait.

use serde::{Deserialize, Serialize};

use agora_types::{Address, ContentHash, Network, Timestamp, TxKind};

use crate::StoreError;

/// A persisted relay job.
///
/// Lifecycle: created by `submit` with `processed = false`; moved to
/// `processed = true` (optionally `failed = true`) exactly once by the
/// worker or the staleness sweep; never deleted (audit trail).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelayJob {
    pub id: u64,
    pub network: Network,
    pub kind: TxKind,
    pub sender: Address,
    /// Content hash of the signed envelope — the dedup key.
    pub payload_hash: ContentHash,
    /// The raw JSON payload as submitted.
    pub payload: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub processed: bool,
    pub failed: bool,
}

/// What a caller hands to `submit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub network: Network,
    pub kind: TxKind,
    pub sender: Address,
    pub payload_hash: ContentHash,
    pub payload: String,
}

/// Outcome of an intake call. Both duplicate and fresh submissions are
/// accepted; `created` only tells whether a new row was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub id: u64,
    pub created: bool,
}

/// Trait for the durable relay queue.
pub trait RelayJobStore {
    /// Insert-if-absent keyed by `payload_hash`. Idempotent: resubmitting
    /// the same payload returns the existing job's id with `created: false`.
    fn submit(&self, submission: &JobSubmission, now: Timestamp)
        -> Result<SubmitOutcome, StoreError>;

    /// Fetch one job by id.
    fn job(&self, id: u64) -> Result<RelayJob, StoreError>;

    /// Look up a job by its payload hash.
    fn job_by_hash(&self, hash: &ContentHash) -> Result<Option<RelayJob>, StoreError>;

    /// All jobs with `processed = false`, oldest first (insertion order),
    /// optionally filtered by network.
    fn list_pending(&self, network: Option<&Network>) -> Result<Vec<RelayJob>, StoreError>;

    /// Compare-and-set terminal transition: if the job is still pending,
    /// set `processed = true` and the given `failed` flag, refresh
    /// `updated_at`, and return `true`. If the job already reached a
    /// terminal state the call is a no-op returning `false` — a late
    /// success never overwrites a sweep, and vice versa.
    fn mark_done(&self, id: u64, failed: bool, now: Timestamp) -> Result<bool, StoreError>;

    /// Force-terminate every pending job older than `threshold_secs` as
    /// `processed = true, failed = true`. Returns how many jobs were swept.
    fn sweep_stale(&self, threshold_secs: u64, now: Timestamp) -> Result<u64, StoreError>;
}
