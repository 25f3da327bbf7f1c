//! Background workers draining the relay queues.
//!
//! One [`RelayWorker`] per network (the single logical consumer for that
//! partition); one [`ProposalWorker`] per chain driving attestation-gated
//! cross-chain proposals. Both are poll loops: every cross-process handoff
//! goes through the store, so a crashed worker loses nothing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use agora_store::ProposalRelayRecord;
use agora_types::{ChainId, Network};

use crate::chain::{ChainClient, SubmissionError};
use crate::error::RelayError;
use crate::service::RelayService;

/// Drains one network's pending relay jobs.
pub struct RelayWorker {
    service: Arc<RelayService>,
    chain: Arc<dyn ChainClient>,
    network: Network,
    poll_interval: Duration,
}

impl RelayWorker {
    pub fn new(
        service: Arc<RelayService>,
        chain: Arc<dyn ChainClient>,
        network: Network,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            chain,
            network,
            poll_interval,
        }
    }

    /// Run until the task is dropped or aborted.
    pub async fn run(self) {
        tracing::info!(network = %self.network, "relay worker started");
        loop {
            if let Err(e) = self.poll_once().await {
                tracing::error!(network = %self.network, error = %e, "relay poll failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One poll cycle: attempt every pending job once, oldest first.
    ///
    /// Transient failures leave the job pending — it is retried next cycle
    /// until it lands or the staleness sweep terminates it. Permanent
    /// rejections are failed immediately rather than waiting for the sweep.
    pub async fn poll_once(&self) -> Result<(), RelayError> {
        let pending = self.service.list_pending(Some(&self.network))?;
        self.service.metrics().pending_jobs.set(pending.len() as i64);

        for job in pending {
            match self.chain.submit(&job).await {
                Ok(receipt) => {
                    self.service.mark_done(job.id, false)?;
                    tracing::info!(
                        id = job.id,
                        network = %self.network,
                        tx_id = %receipt.tx_id,
                        "relay job submitted on-chain"
                    );
                }
                Err(SubmissionError::Transient(reason)) => {
                    tracing::warn!(
                        id = job.id,
                        network = %self.network,
                        %reason,
                        "transient submission failure, job stays pending"
                    );
                }
                Err(SubmissionError::Permanent(reason)) => {
                    self.service.mark_done(job.id, true)?;
                    tracing::warn!(
                        id = job.id,
                        network = %self.network,
                        %reason,
                        "relay job rejected permanently"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Periodically force-fails stale pending jobs.
pub async fn run_sweeper(service: Arc<RelayService>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        match service.sweep_stale() {
            Ok(0) => {}
            Ok(swept) => tracing::warn!(swept, "staleness sweep terminated jobs"),
            Err(e) => tracing::error!(error = %e, "staleness sweep failed"),
        }
    }
}

/// Cross-chain attestation provider boundary (e.g. a storage-proof or
/// timestamp-proof service).
#[async_trait]
pub trait AttestationClient: Send + Sync {
    /// Ask the provider to attest the proposal's snapshot on the target
    /// chain. Returns the provider's correlation id.
    async fn request_attestation(
        &self,
        record: &ProposalRelayRecord,
    ) -> Result<String, SubmissionError>;

    /// Whether a previously requested attestation has landed.
    async fn is_complete(&self, attestation_id: &str) -> Result<bool, SubmissionError>;
}

/// Drives attestation-gated proposals for one chain.
///
/// Two-phase per record: request the attestation once, then poll for its
/// completion and mark the record processed. Snapshot-gated records become
/// eligible only when the chain head has passed their snapshot.
pub struct ProposalWorker {
    service: Arc<RelayService>,
    chain: Arc<dyn ChainClient>,
    attestations: Arc<dyn AttestationClient>,
    chain_id: ChainId,
    poll_interval: Duration,
}

impl ProposalWorker {
    pub fn new(
        service: Arc<RelayService>,
        chain: Arc<dyn ChainClient>,
        attestations: Arc<dyn AttestationClient>,
        chain_id: ChainId,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            chain,
            attestations,
            chain_id,
            poll_interval,
        }
    }

    pub async fn run(self) {
        tracing::info!(chain = %self.chain_id, "proposal worker started");
        loop {
            if let Err(e) = self.poll_once().await {
                tracing::error!(chain = %self.chain_id, error = %e, "proposal poll failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn poll_once(&self) -> Result<(), RelayError> {
        for record in self.service.proposals_to_process()? {
            if record.chain_id != self.chain_id {
                continue;
            }
            if let Err(e) = self.advance(&record).await {
                // Attestation failures are all retryable from the worker's
                // point of view; the record stays unprocessed.
                tracing::warn!(id = %record.id, error = %e, "proposal attestation attempt failed");
            }
        }

        // Snapshot-gated records: only those the chain head has passed.
        let head = match self.chain.head().await {
            Ok(head) => head,
            Err(e) => {
                tracing::warn!(chain = %self.chain_id, error = %e, "chain head unavailable");
                return Ok(());
            }
        };
        for snapshot in self.service.snapshots_to_process(self.chain_id, head)? {
            let record = ProposalRelayRecord {
                id: format!("{}/{}", snapshot.chain_id, snapshot.view_id),
                chain_id: snapshot.chain_id,
                timestamp: agora_types::Timestamp::new(snapshot.snapshot),
                strategy_address: agora_types::Address::zero(),
                attestation_id: snapshot.attestation_id.clone(),
                processed: snapshot.processed,
            };
            match self.attestations.request_attestation(&record).await {
                Ok(_) => {
                    self.service
                        .mark_snapshot_processed(snapshot.chain_id, snapshot.view_id)?;
                }
                Err(e) => {
                    tracing::warn!(
                        chain = %snapshot.chain_id,
                        view = snapshot.view_id,
                        error = %e,
                        "snapshot attestation attempt failed"
                    );
                }
            }
        }
        Ok(())
    }

    /// Advance one proposal through its two-phase attestation.
    async fn advance(&self, record: &ProposalRelayRecord) -> Result<(), SubmissionError> {
        match &record.attestation_id {
            None => {
                let attestation_id = self.attestations.request_attestation(record).await?;
                self.service
                    .set_attestation(&record.id, &attestation_id)
                    .map_err(|e| SubmissionError::Transient(e.to_string()))?;
                tracing::info!(id = %record.id, %attestation_id, "attestation requested");
            }
            Some(attestation_id) => {
                if self.attestations.is_complete(attestation_id).await? {
                    self.service
                        .mark_proposal_processed(&record.id)
                        .map_err(|e| SubmissionError::Transient(e.to_string()))?;
                    tracing::info!(id = %record.id, "proposal attestation complete");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{RelayerInfo, TxReceipt};
    use crate::metrics::RelayerMetrics;
    use crate::service::RelayService;
    use agora_store::{JobSubmission, RelayJob};
    use agora_store_lmdb::{LmdbEnvironment, LmdbProposalRelayStore, LmdbRelayJobStore};
    use agora_types::{Address, ContentHash, Timestamp, TxKind};
    use std::sync::Mutex;

    fn service() -> (tempfile::TempDir, Arc<RelayService>) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 32 * 1024 * 1024).unwrap();
        let service = RelayService::new(
            Arc::new(LmdbRelayJobStore::new(env.clone())),
            Arc::new(LmdbProposalRelayStore::new(env)),
            Arc::new(RelayerMetrics::new()),
        );
        (dir, Arc::new(service))
    }

    fn submission(hash_byte: u8) -> JobSubmission {
        JobSubmission {
            network: Network::from("eth"),
            kind: TxKind::Vote,
            sender: Address::parse("0x00000000000000000000000000000000000000aa").unwrap(),
            payload_hash: ContentHash::new([hash_byte; 32]),
            payload: r#"{"choice":1}"#.to_string(),
        }
    }

    /// Chain client whose behavior is scripted per payload-hash first byte.
    struct ScriptedChain {
        submissions: Mutex<Vec<u64>>,
    }

    impl ScriptedChain {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                submissions: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChainClient for ScriptedChain {
        async fn submit(&self, job: &RelayJob) -> Result<TxReceipt, SubmissionError> {
            self.submissions.lock().unwrap().push(job.id);
            match job.payload_hash.as_bytes()[0] {
                0xEE => Err(SubmissionError::Transient("rpc timeout".into())),
                0xFF => Err(SubmissionError::Permanent("invalid payload".into())),
                _ => Ok(TxReceipt {
                    tx_id: format!("0xtx{:02x}", job.id),
                }),
            }
        }

        async fn relayer_info(&self) -> Result<RelayerInfo, SubmissionError> {
            Ok(RelayerInfo {
                address: Address::parse("0x00000000000000000000000000000000000000bb").unwrap(),
                has_minimum_balance: true,
            })
        }

        async fn head(&self) -> Result<u64, SubmissionError> {
            Ok(500)
        }
    }

    fn worker(service: Arc<RelayService>, chain: Arc<ScriptedChain>) -> RelayWorker {
        RelayWorker::new(service, chain, Network::from("eth"), Duration::from_secs(1))
    }

    // ── Worker outcome classification ───────────────────────────────────

    #[tokio::test]
    async fn successful_submission_marks_job_done() {
        let (_dir, service) = service();
        let chain = ScriptedChain::new();
        let outcome = service.submit(&submission(0x01)).unwrap();

        worker(service.clone(), chain).poll_once().await.unwrap();

        let job = service.job(outcome.id).unwrap();
        assert!(job.processed);
        assert!(!job.failed);
        assert!(service.list_pending(None).unwrap().is_empty());
    }

    #[tokio::test]
    async fn transient_failure_leaves_job_pending_for_retry() {
        let (_dir, service) = service();
        let chain = ScriptedChain::new();
        service.submit(&submission(0xEE)).unwrap();

        let w = worker(service.clone(), chain.clone());
        w.poll_once().await.unwrap();
        assert_eq!(service.list_pending(None).unwrap().len(), 1);

        // next cycle retries the same job
        w.poll_once().await.unwrap();
        assert_eq!(chain.submissions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn permanent_rejection_fails_job_immediately() {
        let (_dir, service) = service();
        let chain = ScriptedChain::new();
        let outcome = service.submit(&submission(0xFF)).unwrap();

        worker(service.clone(), chain.clone()).poll_once().await.unwrap();

        let job = service.job(outcome.id).unwrap();
        assert!(job.processed);
        assert!(job.failed);

        // terminated jobs are not retried
        worker(service.clone(), chain.clone()).poll_once().await.unwrap();
        assert_eq!(chain.submissions.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn worker_only_touches_its_own_network() {
        let (_dir, service) = service();
        let chain = ScriptedChain::new();
        let mut other = submission(0x02);
        other.network = Network::from("sn");
        service.submit(&submission(0x01)).unwrap();
        service.submit(&other).unwrap();

        worker(service.clone(), chain.clone()).poll_once().await.unwrap();

        assert_eq!(chain.submissions.lock().unwrap().len(), 1);
        assert_eq!(
            service
                .list_pending(Some(&Network::from("sn")))
                .unwrap()
                .len(),
            1
        );
    }

    // ── End-to-end queue scenario ───────────────────────────────────────

    #[tokio::test]
    async fn submit_list_mark_done_round_trip() {
        let (_dir, service) = service();
        let outcome = service.submit(&submission(0x01)).unwrap();

        let pending = service.list_pending(Some(&Network::from("eth"))).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, outcome.id);

        assert!(service.mark_done(outcome.id, false).unwrap());
        assert!(service
            .list_pending(Some(&Network::from("eth")))
            .unwrap()
            .is_empty());

        let job = service.job(outcome.id).unwrap();
        assert!(job.processed);
        assert!(!job.failed);
    }

    #[tokio::test]
    async fn sweep_bounds_pending_jobs_in_time() {
        let (_dir, service) = service();
        service.submit(&submission(0x01)).unwrap();

        // not yet stale
        let now = Timestamp::now();
        assert_eq!(service.sweep_stale_at(crate::STALE_AFTER_SECS, now).unwrap(), 0);

        // 24h later the job must be terminated regardless of worker activity
        let later = Timestamp::new(now.as_secs() + crate::STALE_AFTER_SECS);
        assert_eq!(
            service.sweep_stale_at(crate::STALE_AFTER_SECS, later).unwrap(),
            1
        );
        let job = service.job_by_hash(&ContentHash::new([0x01; 32])).unwrap().unwrap();
        assert!(job.processed && job.failed);
    }

    // ── Proposal attestation flow ───────────────────────────────────────

    struct ScriptedAttestations {
        complete: Mutex<bool>,
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AttestationClient for ScriptedAttestations {
        async fn request_attestation(
            &self,
            record: &ProposalRelayRecord,
        ) -> Result<String, SubmissionError> {
            self.requests.lock().unwrap().push(record.id.clone());
            Ok("att-1".to_string())
        }

        async fn is_complete(&self, _attestation_id: &str) -> Result<bool, SubmissionError> {
            Ok(*self.complete.lock().unwrap())
        }
    }

    #[tokio::test]
    async fn proposal_goes_through_two_phase_attestation() {
        let (_dir, service) = service();
        let attestations = Arc::new(ScriptedAttestations {
            complete: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
        });
        let worker = ProposalWorker::new(
            service.clone(),
            ScriptedChain::new(),
            attestations.clone(),
            ChainId(1),
            Duration::from_secs(1),
        );

        service
            .register_proposal(&ProposalRelayRecord {
                id: "p-1".to_string(),
                chain_id: ChainId(1),
                timestamp: Timestamp::new(1_000),
                strategy_address: Address::zero(),
                attestation_id: None,
                processed: false,
            })
            .unwrap();

        // phase 1: attestation requested and recorded
        worker.poll_once().await.unwrap();
        let p = service.proposal("p-1").unwrap().unwrap();
        assert_eq!(p.attestation_id.as_deref(), Some("att-1"));
        assert!(!p.processed);

        // attestation still incomplete: nothing changes
        worker.poll_once().await.unwrap();
        assert!(!service.proposal("p-1").unwrap().unwrap().processed);

        // phase 2: completion observed, record processed
        *attestations.complete.lock().unwrap() = true;
        worker.poll_once().await.unwrap();
        assert!(service.proposal("p-1").unwrap().unwrap().processed);
    }

    #[tokio::test]
    async fn snapshot_records_wait_for_the_chain_head() {
        let (_dir, service) = service();
        let attestations = Arc::new(ScriptedAttestations {
            complete: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
        });
        let worker = ProposalWorker::new(
            service.clone(),
            ScriptedChain::new(), // head() == 500
            attestations.clone(),
            ChainId(1),
            Duration::from_secs(1),
        );

        for (view, snap) in [(1u64, 400u64), (2, 600)] {
            service
                .enqueue_snapshot(&agora_store::SnapshotRelayRecord {
                    chain_id: ChainId(1),
                    view_id: view,
                    snapshot: snap,
                    attestation_id: None,
                    processed: false,
                })
                .unwrap();
        }

        worker.poll_once().await.unwrap();

        // only the record below the head (400 <= 500) was attested
        assert_eq!(attestations.requests.lock().unwrap().len(), 1);
        assert!(service.snapshots_to_process(ChainId(1), 500).unwrap().is_empty());
        assert_eq!(service.snapshots_to_process(ChainId(1), 600).unwrap().len(), 1);
    }
}
