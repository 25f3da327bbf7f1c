//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

const MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) meta_db: Database<Str, Bytes>,
    pub(crate) jobs_db: Database<Bytes, Bytes>,
    pub(crate) jobs_by_hash_db: Database<Bytes, Bytes>,
    pub(crate) proposals_db: Database<Str, Bytes>,
    pub(crate) snapshots_db: Database<Bytes, Bytes>,
    pub(crate) merkle_requests_db: Database<Str, Bytes>,
    pub(crate) merkle_trees_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// The path must be an existing directory; `map_size` is the maximum
    /// total size of the memory map in bytes.
    pub fn open(path: &Path, map_size: usize) -> Result<Arc<Self>, LmdbError> {
        // Safety: we never open the same environment path twice within one
        // process, which is the invariant heed's unsafe `open` asks for.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        let jobs_db = env.create_database(&mut wtxn, Some("relay_jobs"))?;
        let jobs_by_hash_db = env.create_database(&mut wtxn, Some("relay_jobs_by_hash"))?;
        let proposals_db = env.create_database(&mut wtxn, Some("registered_proposals"))?;
        let snapshots_db = env.create_database(&mut wtxn, Some("snapshot_proposals"))?;
        let merkle_requests_db = env.create_database(&mut wtxn, Some("merkletree_requests"))?;
        let merkle_trees_db = env.create_database(&mut wtxn, Some("merkletrees"))?;
        wtxn.commit()?;

        Ok(Arc::new(Self {
            env,
            meta_db,
            jobs_db,
            jobs_by_hash_db,
            proposals_db,
            snapshots_db,
            merkle_requests_db,
            merkle_trees_db,
        }))
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }
}
