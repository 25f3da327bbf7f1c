//! Execution intent types.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use agora_types::{Address, ChainId};

/// The closed set of execution-strategy variants.
///
/// A closed enum (rather than a string-keyed registry) makes an unhandled
/// variant a compile-time exhaustiveness gap instead of a runtime lookup
/// failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionKind {
    QuorumAvatar,
    QuorumTimelock,
    Axiom,
    Isokratia,
    EthRelayer,
    None,
}

/// How a single call is dispatched by the execution strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallOperation {
    Call,
    DelegateCall,
}

impl CallOperation {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Call => 0,
            Self::DelegateCall => 1,
        }
    }
}

/// One call in an execution batch.
///
/// `salt` disambiguates otherwise-identical batches: the execution hash
/// covers it, so re-proposing the same calls with fresh salts yields a new
/// replay-protection key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCall {
    pub target: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub operation: CallOperation,
    pub salt: U256,
}

/// An immutable execution intent: which strategy variant runs which calls.
///
/// Built once per proposal/vote action and handed to the encoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionIntent {
    pub kind: ExecutionKind,
    pub calls: Vec<ExecutionCall>,
}

impl ExecutionIntent {
    pub fn new(kind: ExecutionKind, calls: Vec<ExecutionCall>) -> Self {
        Self { kind, calls }
    }

    /// Encode this intent against a deployed strategy.
    pub fn encode(
        &self,
        strategy: &ExecutionStrategyConfig,
    ) -> Result<crate::encoder::EncodedExecution, crate::error::ExecutionError> {
        crate::encoder::encode(
            self.kind,
            &strategy.address,
            strategy.destination.as_ref(),
            &self.calls,
        )
    }
}

/// A deployed execution strategy, as configured on a space.
///
/// `destination` is only present for cross-chain variants (`EthRelayer`),
/// where the calls run on a chain other than the one the proposal lives on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStrategyConfig {
    pub address: Address,
    pub kind: ExecutionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Address>,
    pub quorum: U256,
    pub chain_of_record: ChainId,
}
