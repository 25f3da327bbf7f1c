//! LMDB storage backend for the Agora relay service.
//!
//! Implements the `agora-store` traits using the `heed` LMDB bindings.
//! Each logical table maps to one LMDB database within a single
//! environment; multi-table invariants (job dedup, the merkle
//! request/tree pair) are upheld by doing both writes inside one LMDB
//! write transaction.

pub mod environment;
pub mod error;
pub mod merkle;
pub mod proposal;
pub mod relay_job;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use merkle::LmdbMerkleStore;
pub use proposal::LmdbProposalRelayStore;
pub use relay_job::LmdbRelayJobStore;
