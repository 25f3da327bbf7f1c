//! Merkle registry storage trait.

use serde::{Deserialize, Serialize};

use agora_types::ContentHash;

use crate::StoreError;

/// A tracked tree-build request, keyed by a caller-chosen correlation id.
///
/// Created before the (possibly expensive) build starts, so concurrent
/// duplicate requests observe "in flight" instead of re-triggering the
/// build; `root` is set atomically together with the tree insert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MerkleBuildRequest {
    pub id: String,
    #[serde(default)]
    pub root: Option<ContentHash>,
    pub processed: bool,
}

pub trait MerkleStore {
    /// Record that a build for `id` has been requested. Idempotent.
    fn save_request(&self, id: &str) -> Result<(), StoreError>;

    /// Atomically insert the tree keyed by `root` (if absent — identical
    /// leaf sets collapse to one row) and mark request `id` processed with
    /// that root. A reader never observes one write without the other.
    fn save_tree(
        &self,
        id: &str,
        root: &ContentHash,
        leaves: &[ContentHash],
    ) -> Result<(), StoreError>;

    /// The ordered leaf list for a stored tree.
    fn tree(&self, root: &ContentHash) -> Result<Option<Vec<ContentHash>>, StoreError>;

    /// The state of a build request.
    fn build_request(&self, id: &str) -> Result<Option<MerkleBuildRequest>, StoreError>;
}
