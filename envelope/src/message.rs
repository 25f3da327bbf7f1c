//! Envelope and action message types.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use agora_routing::StrategyConfig;
use agora_types::{Address, Choice, ContentHash};

/// An execution strategy reference as it appears inside a signed message:
/// the deployed address plus its encoded parameter blobs in wire form
/// (`0x`-hex strings).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStrategyRef {
    pub address: Address,
    pub params: Vec<String>,
}

impl ExecutionStrategyRef {
    /// The "no execution" marker: the zero address with no params.
    pub fn none() -> Self {
        Self {
            address: Address::zero(),
            params: Vec::new(),
        }
    }

    pub fn from_params(address: Address, params: &[Vec<u8>]) -> Self {
        Self {
            address,
            params: params
                .iter()
                .map(|p| format!("0x{}", hex::encode(p)))
                .collect(),
        }
    }
}

/// A proposal creation action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Propose {
    pub space: Address,
    pub authenticator: Address,
    pub strategies: Vec<StrategyConfig>,
    pub execution_strategy: ExecutionStrategyRef,
    pub metadata_uri: String,
    /// Replay-protection salt, chosen fresh per proposal.
    pub salt: String,
}

/// A proposal update action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateProposal {
    pub space: Address,
    pub proposal: u64,
    pub authenticator: Address,
    pub execution_strategy: ExecutionStrategyRef,
    pub metadata_uri: String,
}

/// A vote action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub space: Address,
    pub authenticator: Address,
    pub strategies: Vec<StrategyConfig>,
    pub proposal: u64,
    pub choice: Choice,
    pub metadata_uri: String,
}

/// An address alias registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub alias: Address,
}

/// The signature attached to an envelope by the signing boundary.
///
/// Domain and types stay opaque JSON: typed-data signing is an external
/// collaborator and this crate never inspects its internals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureData {
    pub address: Address,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<serde_json::Value>,
}

/// One governance action, optionally signed.
///
/// Once signed, an envelope is immutable and content-addressable: its
/// payload hash is its identity for relay dedup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<SignatureData>,
}

impl<T: Serialize + DeserializeOwned> Envelope<T> {
    pub fn unsigned(data: T) -> Self {
        Self {
            data,
            signature_data: None,
        }
    }

    /// keccak-256 over the canonical JSON serialization of the whole
    /// envelope (data + signature). Struct fields serialize in declaration
    /// order, so the same value always produces the same bytes — this is
    /// the relay service's dedup key.
    pub fn payload_hash(&self) -> ContentHash {
        let json = serde_json::to_vec(self).expect("envelope types serialize infallibly");
        let mut hasher = Keccak256::new();
        hasher.update(&json);
        let out = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(out.as_slice());
        ContentHash::new(digest)
    }

    pub fn is_signed(&self) -> bool {
        self.signature_data.is_some()
    }
}
