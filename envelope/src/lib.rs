//! Governance action envelopes.
//!
//! An envelope is the signed (or about-to-be-signed) unit of data for one
//! governance action. This crate builds envelopes from a resolved route and
//! an execution intent, hands them to the signing boundary, and dispatches
//! them either directly on-chain or to the relay service.

pub mod boundary;
pub mod builder;
pub mod dispatch;
pub mod error;
pub mod message;

pub use boundary::{
    DirectSubmitter, HttpPinner, HttpRelayClient, MetadataPinner, Pinned, RelayClient,
    RelayRequest, TypedDataSigner,
};
pub use builder::{EnvelopeBuilder, ProposalStrategyData};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::EnvelopeError;
pub use message::{
    Alias, Envelope, ExecutionStrategyRef, Propose, SignatureData, UpdateProposal, Vote,
};
