//! Abstract persistence traits for the relay service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The relay worker, RPC boundary, and Merkle registry depend only
//! on the traits; cross-process coordination happens entirely inside the
//! backend's transaction boundary.

pub mod error;
pub mod merkle;
pub mod proposal;
pub mod relay_job;

pub use error::StoreError;
pub use merkle::{MerkleBuildRequest, MerkleStore};
pub use proposal::{ProposalRelayRecord, ProposalRelayStore, SnapshotRelayRecord};
pub use relay_job::{JobSubmission, RelayJob, RelayJobStore, SubmitOutcome};
