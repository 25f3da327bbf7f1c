//! The Merkle registry: persisted trees plus asynchronous build tracking.

use std::sync::Arc;

use agora_store::{MerkleBuildRequest, MerkleStore};
use agora_types::ContentHash;

use crate::error::MerkleError;
use crate::tree::MerkleTree;

/// Registry over a persisted [`MerkleStore`].
///
/// The intended flow for an expensive build: `request_build(id)` first (so
/// concurrent duplicates observe "in flight"), then `build_and_save(id,
/// leaves)` once the leaf set is assembled.
pub struct MerkleRegistry {
    store: Arc<dyn MerkleStore + Send + Sync>,
}

impl MerkleRegistry {
    pub fn new(store: Arc<dyn MerkleStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Record that a build for `id` has been requested.
    pub fn request_build(&self, id: &str) -> Result<(), MerkleError> {
        self.store.save_request(id)?;
        Ok(())
    }

    /// Build the tree and atomically persist it together with the request
    /// completion. Returns the root.
    pub fn build_and_save(
        &self,
        id: &str,
        leaves: &[ContentHash],
    ) -> Result<ContentHash, MerkleError> {
        let tree = MerkleTree::build(leaves);
        let root = tree.root();
        self.store.save_tree(id, &root, leaves)?;
        Ok(root)
    }

    /// The ordered leaf list for a stored tree.
    pub fn tree(&self, root: &ContentHash) -> Result<Option<Vec<ContentHash>>, MerkleError> {
        Ok(self.store.tree(root)?)
    }

    /// The state of a build request.
    pub fn build_status(&self, id: &str) -> Result<Option<MerkleBuildRequest>, MerkleError> {
        Ok(self.store.build_request(id)?)
    }

    /// Inclusion proof for `leaf` in the stored tree `root`.
    ///
    /// Rebuilds the tree from the stored leaf list; the fixed hashing
    /// convention makes the rebuilt proofs identical across calls.
    pub fn proof(
        &self,
        root: &ContentHash,
        leaf: &ContentHash,
    ) -> Result<Vec<ContentHash>, MerkleError> {
        let leaves = self
            .store
            .tree(root)?
            .ok_or_else(|| MerkleError::UnknownTree(root.to_hex()))?;
        MerkleTree::build(&leaves)
            .proof(leaf)
            .ok_or(MerkleError::LeafNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::StoreError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory MerkleStore mirroring the LMDB backend's semantics.
    #[derive(Default)]
    struct MemoryMerkleStore {
        requests: Mutex<HashMap<String, MerkleBuildRequest>>,
        trees: Mutex<HashMap<ContentHash, Vec<ContentHash>>>,
    }

    impl MerkleStore for MemoryMerkleStore {
        fn save_request(&self, id: &str) -> Result<(), StoreError> {
            self.requests
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_insert_with(|| MerkleBuildRequest {
                    id: id.to_string(),
                    root: None,
                    processed: false,
                });
            Ok(())
        }

        fn save_tree(
            &self,
            id: &str,
            root: &ContentHash,
            leaves: &[ContentHash],
        ) -> Result<(), StoreError> {
            self.trees
                .lock()
                .unwrap()
                .entry(*root)
                .or_insert_with(|| leaves.to_vec());
            self.requests.lock().unwrap().insert(
                id.to_string(),
                MerkleBuildRequest {
                    id: id.to_string(),
                    root: Some(*root),
                    processed: true,
                },
            );
            Ok(())
        }

        fn tree(&self, root: &ContentHash) -> Result<Option<Vec<ContentHash>>, StoreError> {
            Ok(self.trees.lock().unwrap().get(root).cloned())
        }

        fn build_request(&self, id: &str) -> Result<Option<MerkleBuildRequest>, StoreError> {
            Ok(self.requests.lock().unwrap().get(id).cloned())
        }
    }

    fn leaf(n: u8) -> ContentHash {
        ContentHash::new([n; 32])
    }

    #[test]
    fn request_build_save_status_flow() {
        let registry = MerkleRegistry::new(Arc::new(MemoryMerkleStore::default()));

        registry.request_build("req-1").unwrap();
        let status = registry.build_status("req-1").unwrap().unwrap();
        assert!(!status.processed);

        let leaves = vec![leaf(0x0A), leaf(0x0B)];
        let root = registry.build_and_save("req-1", &leaves).unwrap();

        let status = registry.build_status("req-1").unwrap().unwrap();
        assert!(status.processed);
        assert_eq!(status.root, Some(root));
        assert_eq!(registry.tree(&root).unwrap().unwrap(), leaves);
    }

    #[test]
    fn proofs_from_stored_leaves_verify() {
        let registry = MerkleRegistry::new(Arc::new(MemoryMerkleStore::default()));
        let leaves: Vec<ContentHash> = (1..=5).map(leaf).collect();
        let root = registry.build_and_save("req-1", &leaves).unwrap();

        for l in &leaves {
            let proof = registry.proof(&root, l).unwrap();
            assert!(MerkleTree::verify(&root, l, &proof));
        }
        assert!(matches!(
            registry.proof(&root, &leaf(0x99)),
            Err(MerkleError::LeafNotFound)
        ));
        assert!(matches!(
            registry.proof(&leaf(0x77), &leaf(1)),
            Err(MerkleError::UnknownTree(_))
        ));
    }
}
