//! LMDB implementation of MerkleStore.
//!
//! `save_tree` performs the tree insert and the request update inside a
//! single write transaction: a reader either sees the request still
//! pending, or processed together with a resolvable tree — never a root
//! pointing at a missing tree.

use std::sync::Arc;

use agora_store::{MerkleBuildRequest, MerkleStore, StoreError};
use agora_types::ContentHash;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct LmdbMerkleStore {
    env: Arc<LmdbEnvironment>,
}

impl LmdbMerkleStore {
    pub fn new(env: Arc<LmdbEnvironment>) -> Self {
        Self { env }
    }
}

impl MerkleStore for LmdbMerkleStore {
    fn save_request(&self, id: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;
        if self
            .env
            .merkle_requests_db
            .get(&wtxn, id)
            .map_err(LmdbError::from)?
            .is_some()
        {
            // Concurrent duplicate requests observe "in flight" rather than
            // resetting the request state.
            return Ok(());
        }
        let request = MerkleBuildRequest {
            id: id.to_string(),
            root: None,
            processed: false,
        };
        let bytes = bincode::serialize(&request).map_err(LmdbError::from)?;
        self.env
            .merkle_requests_db
            .put(&mut wtxn, id, &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn save_tree(
        &self,
        id: &str,
        root: &ContentHash,
        leaves: &[ContentHash],
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.env().write_txn().map_err(LmdbError::from)?;

        // Insert-if-absent: identical leaf sets collapse to one row.
        if self
            .env
            .merkle_trees_db
            .get(&wtxn, root.as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            let bytes = bincode::serialize(&leaves.to_vec()).map_err(LmdbError::from)?;
            self.env
                .merkle_trees_db
                .put(&mut wtxn, root.as_bytes(), &bytes)
                .map_err(LmdbError::from)?;
        }

        let request = MerkleBuildRequest {
            id: id.to_string(),
            root: Some(*root),
            processed: true,
        };
        let bytes = bincode::serialize(&request).map_err(LmdbError::from)?;
        self.env
            .merkle_requests_db
            .put(&mut wtxn, id, &bytes)
            .map_err(LmdbError::from)?;

        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn tree(&self, root: &ContentHash) -> Result<Option<Vec<ContentHash>>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = self
            .env
            .merkle_trees_db
            .get(&rtxn, root.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let leaves: Vec<ContentHash> = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(Some(leaves))
    }

    fn build_request(&self, id: &str) -> Result<Option<MerkleBuildRequest>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = self
            .env
            .merkle_requests_db
            .get(&rtxn, id)
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let request: MerkleBuildRequest = bincode::deserialize(bytes).map_err(LmdbError::from)?;
        Ok(Some(request))
    }
}
