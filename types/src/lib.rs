//! Fundamental types for the Agora relay pipeline.
//!
//! This crate defines the core value types shared across every other crate in
//! the workspace: chain addresses, content hashes, timestamps, network
//! identifiers, and the vote choice enum.

pub mod address;
pub mod chain;
pub mod choice;
pub mod error;
pub mod hash;
pub mod time;
pub mod tx;

pub use address::Address;
pub use chain::{ChainId, Network};
pub use choice::Choice;
pub use error::TypeError;
pub use hash::ContentHash;
pub use time::Timestamp;
pub use tx::TxKind;
