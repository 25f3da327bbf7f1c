//! External collaborator boundaries: signing, pinning, relay forwarding,
//! and direct chain submission.
//!
//! All four are traits so the dispatch path stays testable without wallets
//! or networks; HTTP implementations are provided where one exists.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agora_types::{Address, ContentHash, Network, TxKind};

use crate::error::EnvelopeError;
use crate::message::SignatureData;

/// Black-box typed-data signing (a wallet, a session key, a test fake).
#[async_trait]
pub trait TypedDataSigner: Send + Sync {
    /// The signer's account address.
    fn address(&self) -> Address;

    /// Sign the serialized action message. The domain/types construction is
    /// chain-specific and lives entirely behind this boundary.
    async fn sign(&self, message: &serde_json::Value) -> Result<SignatureData, EnvelopeError>;
}

/// A pinned metadata object.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pinned {
    pub cid: String,
}

/// Metadata pinning collaborator. No action can be dispatched without a
/// resolvable content identifier, so failures abort the dispatch.
#[async_trait]
pub trait MetadataPinner: Send + Sync {
    async fn pin(&self, value: &serde_json::Value) -> Result<Pinned, EnvelopeError>;
}

/// HTTP pinner posting JSON to a pinning endpoint that answers `{ "cid" }`.
pub struct HttpPinner {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPinner {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl MetadataPinner for HttpPinner {
    async fn pin(&self, value: &serde_json::Value) -> Result<Pinned, EnvelopeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(value)
            .send()
            .await
            .map_err(|e| EnvelopeError::Pin(e.to_string()))?
            .error_for_status()
            .map_err(|e| EnvelopeError::Pin(e.to_string()))?;
        response
            .json::<Pinned>()
            .await
            .map_err(|e| EnvelopeError::Pin(e.to_string()))
    }
}

/// What the dispatcher forwards to the relay service: the §6 input boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayRequest {
    pub network: Network,
    pub kind: TxKind,
    pub sender: Address,
    pub hash: ContentHash,
    pub data: serde_json::Value,
}

/// Relay service client boundary.
///
/// A successful forward only means "durably queued": callers needing the
/// outcome poll the job state by hash.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn forward(&self, request: &RelayRequest) -> Result<(), EnvelopeError>;
}

/// HTTP relay client posting to the relay service's intake endpoint.
pub struct HttpRelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn forward(&self, request: &RelayRequest) -> Result<(), EnvelopeError> {
        self.client
            .post(format!("{}/relay", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| EnvelopeError::Relay(e.to_string()))?
            .error_for_status()
            .map_err(|e| EnvelopeError::Relay(e.to_string()))?;
        Ok(())
    }
}

/// Direct on-chain submission via the signer's own account (the
/// `EvmTxRelay` and `DirectChainTx` paths). Returns the transaction id.
#[async_trait]
pub trait DirectSubmitter: Send + Sync {
    async fn submit(&self, payload: &serde_json::Value) -> Result<String, EnvelopeError>;
}
