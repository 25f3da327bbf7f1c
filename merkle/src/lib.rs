//! Merkle trees for whitelist-strategy inclusion proofs.
//!
//! Tree construction and proof generation are pure; the registry persists
//! built trees keyed by their root and tracks asynchronous build requests.

pub mod error;
pub mod registry;
pub mod tree;

pub use error::MerkleError;
pub use registry::MerkleRegistry;
pub use tree::MerkleTree;
