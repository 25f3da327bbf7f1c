//! LMDB implementation of RelayJobStore.
//!
//! Jobs are keyed by a monotonically increasing big-endian `u64` id, so a
//! forward key scan returns insertion order. A secondary database maps the
//! payload hash to the id for dedup and direct lookup.

use std::sync::Arc;

use agora_store::{JobSubmission, RelayJob, RelayJobStore, StoreError, SubmitOutcome};
use agora_types::{ContentHash, Network, Timestamp};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

const NEXT_JOB_ID_KEY: &str = "next_job_id";

pub struct LmdbRelayJobStore {
    env: Arc<LmdbEnvironment>,
}

impl LmdbRelayJobStore {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }
}

impl RelayJobStore for LmdbRelayJobStore {
    fn submit(
        &self,
        submission: &JobSubmission,
        now: Timestamp,
    ) -> Result<SubmitOutcome, StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;

        // Dedup check inside the write transaction: two racing submitters
        // serialize on the txn, so exactly one row wins.
        if let Some(existing) = self
            .env
            .jobs_by_hash_db
            .get(&wtxn, submission.payload_hash.as_bytes())
            .map_err(LmdbError::from)?
        {
            let id = u64::from_be_bytes(
                existing
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("job id index entry".into()))?,
            );
            return Ok(SubmitOutcome { id, created: false });
        }

        let id = match self
            .env
            .meta_db
            .get(&wtxn, NEXT_JOB_ID_KEY)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => u64::from_be_bytes(
                bytes
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("next_job_id".into()))?,
            ),
            None => 1,
        };
        self.env
            .meta_db
            .put(&mut wtxn, NEXT_JOB_ID_KEY, &(id + 1).to_be_bytes())
            .map_err(LmdbError::from)?;

        let job = RelayJob {
            id,
            network: submission.network.clone(),
            kind: submission.kind,
            sender: submission.sender.clone(),
            payload_hash: submission.payload_hash,
            payload: submission.payload.clone(),
            created_at: now,
            updated_at: now,
            processed: false,
            failed: false,
        };
        let bytes = bincode::serialize(&job).map_err(LmdbError::from)?;
        self.env
            .jobs_db
            .put(&mut wtxn, &id.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        self.env
            .jobs_by_hash_db
            .put(
                &mut wtxn,
                submission.payload_hash.as_bytes(),
                &id.to_be_bytes(),
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(SubmitOutcome { id, created: true })
    }

    fn job(&self, id: u64) -> Result<RelayJob, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .jobs_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("relay job {id}")))?;
        let job: RelayJob = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(job)
    }

    fn job_by_hash(&self, hash: &ContentHash) -> Result<Option<RelayJob>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let Some(id_bytes) = self
            .env
            .jobs_by_hash_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let bytes = self
            .env
            .jobs_db
            .get(&rtxn, id_bytes)
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("relay job for hash {hash}")))?;
        let job: RelayJob = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(Some(job))
    }

    fn list_pending(&self, network: Option<&Network>) -> Result<Vec<RelayJob>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let iter = self.env.jobs_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut pending = Vec::new();
        for result in iter {
            let (_key, bytes) = result.map_err(LmdbError::from)?;
            let job: RelayJob = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if job.processed {
                continue;
            }
            if let Some(wanted) = network {
                if &job.network != wanted {
                    continue;
                }
            }
            pending.push(job);
        }
        Ok(pending)
    }

    fn mark_done(&self, id: u64, failed: bool, now: Timestamp) -> Result<bool, StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .jobs_db
            .get(&wtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("relay job {id}")))?;
        let mut job: RelayJob = bincode::deserialize(bytes).map_err(LmdbError::from)?;

        // Compare-and-set on the pending state: the first terminal writer
        // wins, so a late success cannot be overwritten by the sweep.
        if job.processed {
            return Ok(false);
        }
        job.processed = true;
        job.failed = failed;
        job.updated_at = now;

        let bytes = bincode::serialize(&job).map_err(LmdbError::from)?;
        self.env
            .jobs_db
            .put(&mut wtxn, &id.to_be_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn sweep_stale(&self, threshold_secs: u64, now: Timestamp) -> Result<u64, StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;

        let mut stale = Vec::new();
        {
            let iter = self.env.jobs_db.iter(&wtxn).map_err(LmdbError::from)?;
            for result in iter {
                let (_key, bytes) = result.map_err(LmdbError::from)?;
                let job: RelayJob = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                if !job.processed && job.created_at.has_expired(threshold_secs, now) {
                    stale.push(job);
                }
            }
        }

        let swept = stale.len() as u64;
        for mut job in stale {
            job.processed = true;
            job.failed = true;
            job.updated_at = now;
            let bytes = bincode::serialize(&job).map_err(LmdbError::from)?;
            self.env
                .jobs_db
                .put(&mut wtxn, &job.id.to_be_bytes(), &bytes)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;

        if swept > 0 {
            tracing::warn!(swept, "force-failed stale relay jobs");
        }
        Ok(swept)
    }
}
