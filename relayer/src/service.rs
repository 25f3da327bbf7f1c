//! The relay service facade over the persistent queue.
//!
//! Thin, synchronous, and idempotent: every public operation maps to one
//! store transaction. All cross-process coordination lives in the store's
//! transaction boundary — the service holds no locks of its own.

use std::sync::Arc;

use agora_store::{
    JobSubmission, ProposalRelayRecord, ProposalRelayStore, RelayJob, RelayJobStore,
    SnapshotRelayRecord, SubmitOutcome,
};
use agora_types::{ChainId, ContentHash, Network, Timestamp};

use crate::error::RelayError;
use crate::metrics::RelayerMetrics;

/// Pending jobs older than this are force-failed by the sweep. The bound
/// guarantees the pending set shrinks even if a worker crashes
/// mid-processing or the target chain is unreachable indefinitely.
pub const STALE_AFTER_SECS: u64 = 24 * 60 * 60;

pub struct RelayService {
    jobs: Arc<dyn RelayJobStore + Send + Sync>,
    proposals: Arc<dyn ProposalRelayStore + Send + Sync>,
    metrics: Arc<RelayerMetrics>,
}

impl RelayService {
    pub fn new(
        jobs: Arc<dyn RelayJobStore + Send + Sync>,
        proposals: Arc<dyn ProposalRelayStore + Send + Sync>,
        metrics: Arc<RelayerMetrics>,
    ) -> Self {
        Self {
            jobs,
            proposals,
            metrics,
        }
    }

    pub fn metrics(&self) -> &RelayerMetrics {
        &self.metrics
    }

    // ── Job queue ───────────────────────────────────────────────────────

    /// Idempotent intake: duplicate submissions with the same payload hash
    /// are absorbed, and both callers see acceptance.
    pub fn submit(&self, submission: &JobSubmission) -> Result<SubmitOutcome, RelayError> {
        let outcome = self.jobs.submit(submission, Timestamp::now())?;
        if outcome.created {
            self.metrics.jobs_registered.inc();
            tracing::info!(
                id = outcome.id,
                network = %submission.network,
                kind = ?submission.kind,
                hash = %submission.payload_hash,
                "relay job registered"
            );
        } else {
            tracing::debug!(
                id = outcome.id,
                hash = %submission.payload_hash,
                "duplicate relay submission absorbed"
            );
        }
        Ok(outcome)
    }

    pub fn job(&self, id: u64) -> Result<RelayJob, RelayError> {
        Ok(self.jobs.job(id)?)
    }

    pub fn job_by_hash(&self, hash: &ContentHash) -> Result<Option<RelayJob>, RelayError> {
        Ok(self.jobs.job_by_hash(hash)?)
    }

    pub fn list_pending(&self, network: Option<&Network>) -> Result<Vec<RelayJob>, RelayError> {
        Ok(self.jobs.list_pending(network)?)
    }

    /// Terminal marking; no-op if the job already reached a terminal state.
    pub fn mark_done(&self, id: u64, failed: bool) -> Result<bool, RelayError> {
        let transitioned = self.jobs.mark_done(id, failed, Timestamp::now())?;
        if transitioned {
            if failed {
                self.metrics.jobs_failed.inc();
            } else {
                self.metrics.jobs_processed.inc();
            }
        }
        Ok(transitioned)
    }

    /// Force-fail pending jobs older than [`STALE_AFTER_SECS`].
    pub fn sweep_stale(&self) -> Result<u64, RelayError> {
        self.sweep_stale_at(STALE_AFTER_SECS, Timestamp::now())
    }

    /// Sweep with an explicit threshold and clock (testable form).
    pub fn sweep_stale_at(&self, threshold_secs: u64, now: Timestamp) -> Result<u64, RelayError> {
        let swept = self.jobs.sweep_stale(threshold_secs, now)?;
        if swept > 0 {
            self.metrics.jobs_swept.inc_by(swept);
            self.metrics.jobs_failed.inc_by(swept);
        }
        Ok(swept)
    }

    // ── Cross-chain proposal queue ──────────────────────────────────────

    pub fn register_proposal(&self, record: &ProposalRelayRecord) -> Result<(), RelayError> {
        self.proposals.register_proposal(record)?;
        tracing::info!(id = %record.id, chain = %record.chain_id, "proposal registered for attestation");
        Ok(())
    }

    pub fn set_attestation(&self, id: &str, attestation_id: &str) -> Result<(), RelayError> {
        Ok(self.proposals.set_attestation(id, attestation_id)?)
    }

    pub fn proposal(&self, id: &str) -> Result<Option<ProposalRelayRecord>, RelayError> {
        Ok(self.proposals.proposal(id)?)
    }

    pub fn proposals_to_process(&self) -> Result<Vec<ProposalRelayRecord>, RelayError> {
        Ok(self.proposals.proposals_to_process()?)
    }

    pub fn mark_proposal_processed(&self, id: &str) -> Result<(), RelayError> {
        Ok(self.proposals.mark_proposal_processed(id)?)
    }

    pub fn enqueue_snapshot(&self, record: &SnapshotRelayRecord) -> Result<(), RelayError> {
        Ok(self.proposals.enqueue_snapshot(record)?)
    }

    pub fn snapshots_to_process(
        &self,
        chain_id: ChainId,
        max_snapshot: u64,
    ) -> Result<Vec<SnapshotRelayRecord>, RelayError> {
        Ok(self.proposals.snapshots_to_process(chain_id, max_snapshot)?)
    }

    pub fn mark_snapshot_processed(
        &self,
        chain_id: ChainId,
        view_id: u64,
    ) -> Result<(), RelayError> {
        Ok(self.proposals.mark_snapshot_processed(chain_id, view_id)?)
    }
}
