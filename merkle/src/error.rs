use thiserror::Error;

use agora_store::StoreError;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("no tree stored for root {0}")]
    UnknownTree(String),

    #[error("leaf is not part of the tree")]
    LeafNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
