//! LMDB implementation of ProposalRelayStore.
//!
//! Proposal records are keyed by their content id; snapshot-gated records
//! use the binary composite key `chain_id (8, BE) ++ view_id (8, BE)` so a
//! prefix scan covers one chain.

use std::ops::Bound;
use std::sync::Arc;

use agora_store::{ProposalRelayRecord, ProposalRelayStore, SnapshotRelayRecord, StoreError};
use agora_types::ChainId;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct LmdbProposalRelayStore {
    env: Arc<LmdbEnvironment>,
}

fn snapshot_key(chain_id: ChainId, view_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&chain_id.as_u64().to_be_bytes());
    key[8..].copy_from_slice(&view_id.to_be_bytes());
    key
}

impl LmdbProposalRelayStore {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }
}

impl ProposalRelayStore for LmdbProposalRelayStore {
    fn register_proposal(&self, record: &ProposalRelayRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        if self
            .env
            .proposals_db
            .get(&wtxn, &record.id)
            .map_err(LmdbError::from)?
            .is_some()
        {
            // Registration is idempotent; the first writer wins.
            return Ok(());
        }
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.env
            .proposals_db
            .put(&mut wtxn, &record.id, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn set_attestation(&self, id: &str, attestation_id: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .proposals_db
            .get(&wtxn, id)
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("registered proposal {id}")))?;
        let mut record: ProposalRelayRecord =
            bincode::deserialize(bytes).map_err(LmdbError::from)?;
        record.attestation_id = Some(attestation_id.to_string());
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.env
            .proposals_db
            .put(&mut wtxn, id, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn proposal(&self, id: &str) -> Result<Option<ProposalRelayRecord>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = self
            .env
            .proposals_db
            .get(&rtxn, id)
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let record: ProposalRelayRecord = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(Some(record))
    }

    fn proposals_to_process(&self) -> Result<Vec<ProposalRelayRecord>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let iter = self
            .env
            .proposals_db
            .iter(&rtxn)
            .map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for result in iter {
            let (_id, bytes) = result.map_err(LmdbError::from)?;
            let record: ProposalRelayRecord =
                bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if !record.processed {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn mark_proposal_processed(&self, id: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .proposals_db
            .get(&wtxn, id)
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("registered proposal {id}")))?;
        let mut record: ProposalRelayRecord =
            bincode::deserialize(bytes).map_err(LmdbError::from)?;
        record.processed = true;
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.env
            .proposals_db
            .put(&mut wtxn, id, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn enqueue_snapshot(&self, record: &SnapshotRelayRecord) -> Result<(), StoreError> {
        let key = snapshot_key(record.chain_id, record.view_id);
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        if self
            .env
            .snapshots_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Ok(());
        }
        let bytes = bincode::serialize(record).map_err(LmdbError::from)?;
        self.env
            .snapshots_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn snapshots_to_process(
        &self,
        chain_id: ChainId,
        max_snapshot: u64,
    ) -> Result<Vec<SnapshotRelayRecord>, StoreError> {
        let lower = snapshot_key(chain_id, 0);
        let upper = snapshot_key(chain_id, u64::MAX);

        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Included(upper.as_slice()),
        );
        let iter = self
            .env
            .snapshots_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for result in iter {
            let (_key, bytes) = result.map_err(LmdbError::from)?;
            let record: SnapshotRelayRecord =
                bincode::deserialize(bytes).map_err(LmdbError::from)?;
            if !record.processed && record.snapshot <= max_snapshot {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn mark_snapshot_processed(
        &self,
        chain_id: ChainId,
        view_id: u64,
    ) -> Result<(), StoreError> {
        let key = snapshot_key(chain_id, view_id);
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        let bytes = self
            .env
            .snapshots_db
            .get(&wtxn, &key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| {
                LmdbError::NotFound(format!("snapshot proposal {chain_id}/{view_id}"))
            })?;
        let mut record: SnapshotRelayRecord =
            bincode::deserialize(bytes).map_err(LmdbError::from)?;
        record.processed = true;
        let bytes = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.env
            .snapshots_db
            .put(&mut wtxn, &key, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::{Address, Timestamp};

    fn open_store() -> (tempfile::TempDir, LmdbProposalRelayStore) {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 32 * 1024 * 1024).unwrap();
        (dir, LmdbProposalRelayStore::new(env))
    }

    fn record(id: &str) -> ProposalRelayRecord {
        ProposalRelayRecord {
            id: id.to_string(),
            chain_id: ChainId(1),
            timestamp: Timestamp::new(1_000),
            strategy_address: Address::parse("0x00000000000000000000000000000000000000cc")
                .unwrap(),
            attestation_id: None,
            processed: false,
        }
    }

    #[test]
    fn register_then_attest_then_process() {
        let (_dir, store) = open_store();
        store.register_proposal(&record("p-1")).unwrap();

        assert_eq!(store.proposals_to_process().unwrap().len(), 1);

        store.set_attestation("p-1", "att-42").unwrap();
        let p = store.proposal("p-1").unwrap().unwrap();
        assert_eq!(p.attestation_id.as_deref(), Some("att-42"));
        assert!(!p.processed);

        store.mark_proposal_processed("p-1").unwrap();
        assert!(store.proposals_to_process().unwrap().is_empty());
        assert!(store.proposal("p-1").unwrap().unwrap().processed);
    }

    #[test]
    fn duplicate_registration_keeps_first_record() {
        let (_dir, store) = open_store();
        store.register_proposal(&record("p-1")).unwrap();
        store.set_attestation("p-1", "att-1").unwrap();

        // A retried registration must not clobber the attestation.
        store.register_proposal(&record("p-1")).unwrap();
        let p = store.proposal("p-1").unwrap().unwrap();
        assert_eq!(p.attestation_id.as_deref(), Some("att-1"));
    }

    #[test]
    fn snapshot_queue_is_ceiling_gated() {
        let (_dir, store) = open_store();
        for (view, snap) in [(1u64, 100u64), (2, 200), (3, 300)] {
            store
                .enqueue_snapshot(&SnapshotRelayRecord {
                    chain_id: ChainId(5),
                    view_id: view,
                    snapshot: snap,
                    attestation_id: None,
                    processed: false,
                })
                .unwrap();
        }
        // A record on another chain must never appear in the scan.
        store
            .enqueue_snapshot(&SnapshotRelayRecord {
                chain_id: ChainId(6),
                view_id: 9,
                snapshot: 100,
                attestation_id: None,
                processed: false,
            })
            .unwrap();

        let eligible = store.snapshots_to_process(ChainId(5), 200).unwrap();
        let views: Vec<u64> = eligible.iter().map(|r| r.view_id).collect();
        assert_eq!(views, vec![1, 2]);

        store.mark_snapshot_processed(ChainId(5), 1).unwrap();
        let eligible = store.snapshots_to_process(ChainId(5), 200).unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].view_id, 2);
    }
}
