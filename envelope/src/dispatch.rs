//! The relay dispatcher state machine.
//!
//! Per action: `Resolved → Encoded → Signed → {SubmittedDirect |
//! ForwardedToRelay}`. The two suspension points are the signature await
//! (wallet interaction) and the relay/chain round-trip; no state is
//! skipped — an envelope is never forwarded unsigned, and never reported
//! submitted without a receipt or a relay acknowledgement.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use agora_routing::RelayMode;
use agora_types::{ContentHash, Network, TxKind};

use crate::boundary::{DirectSubmitter, RelayClient, RelayRequest, TypedDataSigner};
use crate::error::EnvelopeError;
use crate::message::Envelope;

/// Terminal state of a dispatched action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Submitted by the signer's own account; carries the transaction id.
    SubmittedDirect { tx_id: String },
    /// Durably queued at the relay service. "Queued" is not "executed":
    /// callers poll the job by payload hash for the outcome.
    ForwardedToRelay { payload_hash: ContentHash },
}

/// Drives signed envelopes to their submission path.
pub struct Dispatcher {
    signer: Arc<dyn TypedDataSigner>,
    relay: Arc<dyn RelayClient>,
    direct: Arc<dyn DirectSubmitter>,
}

impl Dispatcher {
    pub fn new(
        signer: Arc<dyn TypedDataSigner>,
        relay: Arc<dyn RelayClient>,
        direct: Arc<dyn DirectSubmitter>,
    ) -> Self {
        Self {
            signer,
            relay,
            direct,
        }
    }

    /// Dispatch an encoded envelope along the resolved relay mode.
    pub async fn dispatch<T>(
        &self,
        network: Network,
        kind: TxKind,
        envelope: Envelope<T>,
        relay_mode: RelayMode,
    ) -> Result<DispatchOutcome, EnvelopeError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match relay_mode {
            // Signature paths: collect the signature locally, then hand the
            // signed envelope to the relay service which pays for gas.
            RelayMode::StarknetNative | RelayMode::EvmSigRelay => {
                let message = serde_json::to_value(&envelope.data)
                    .expect("action messages serialize infallibly");
                let signature_data = self.signer.sign(&message).await?;
                let signed = Envelope {
                    data: envelope.data,
                    signature_data: Some(signature_data),
                };
                self.forward(network, kind, signed).await
            }

            // Transaction paths: the signer's own transaction finality is
            // the guarantee; nothing is queued on its behalf.
            RelayMode::EvmTxRelay | RelayMode::DirectChainTx => {
                let payload = serde_json::to_value(&envelope)
                    .expect("action messages serialize infallibly");
                let tx_id = self.direct.submit(&payload).await?;
                tracing::debug!(%network, ?kind, %tx_id, "submitted directly on-chain");
                Ok(DispatchOutcome::SubmittedDirect { tx_id })
            }
        }
    }

    async fn forward<T>(
        &self,
        network: Network,
        kind: TxKind,
        envelope: Envelope<T>,
    ) -> Result<DispatchOutcome, EnvelopeError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let Some(signature_data) = envelope.signature_data.as_ref() else {
            return Err(EnvelopeError::NotSigned);
        };
        let sender = signature_data.address.clone();
        let payload_hash = envelope.payload_hash();

        let request = RelayRequest {
            network: network.clone(),
            kind,
            sender,
            hash: payload_hash,
            data: serde_json::to_value(&envelope)
                .expect("action messages serialize infallibly"),
        };
        self.relay.forward(&request).await?;
        tracing::debug!(%network, ?kind, %payload_hash, "forwarded envelope to relay");
        Ok(DispatchOutcome::ForwardedToRelay { payload_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Pinned;
    use crate::message::{SignatureData, Vote};
    use agora_types::{Address, Choice};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn addr(n: u8) -> Address {
        Address::parse(format!("0x{:040x}", n)).unwrap()
    }

    fn vote_envelope() -> Envelope<Vote> {
        Envelope::unsigned(Vote {
            space: addr(1),
            authenticator: addr(2),
            strategies: Vec::new(),
            proposal: 3,
            choice: Choice::For,
            metadata_uri: String::new(),
        })
    }

    struct FakeSigner;

    #[async_trait]
    impl TypedDataSigner for FakeSigner {
        fn address(&self) -> Address {
            addr(0xAA)
        }

        async fn sign(
            &self,
            _message: &serde_json::Value,
        ) -> Result<SignatureData, EnvelopeError> {
            Ok(SignatureData {
                address: addr(0xAA),
                signature: "0xfeed".to_string(),
                domain: None,
                types: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingRelay {
        requests: Mutex<Vec<RelayRequest>>,
    }

    #[async_trait]
    impl RelayClient for RecordingRelay {
        async fn forward(&self, request: &RelayRequest) -> Result<(), EnvelopeError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDirect {
        payloads: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl DirectSubmitter for RecordingDirect {
        async fn submit(&self, payload: &serde_json::Value) -> Result<String, EnvelopeError> {
            self.payloads.lock().unwrap().push(payload.clone());
            Ok("0xtx01".to_string())
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<RecordingRelay>, Arc<RecordingDirect>) {
        let relay = Arc::new(RecordingRelay::default());
        let direct = Arc::new(RecordingDirect::default());
        let dispatcher = Dispatcher::new(Arc::new(FakeSigner), relay.clone(), direct.clone());
        (dispatcher, relay, direct)
    }

    #[tokio::test]
    async fn sig_relay_path_signs_then_forwards() {
        let (dispatcher, relay, direct) = dispatcher();

        let outcome = dispatcher
            .dispatch(
                Network::from("eth"),
                TxKind::Vote,
                vote_envelope(),
                RelayMode::EvmSigRelay,
            )
            .await
            .unwrap();

        let requests = relay.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(direct.payloads.lock().unwrap().is_empty());

        // the forwarded data is the *signed* envelope, and the hash covers it
        let forwarded = &requests[0];
        assert_eq!(forwarded.sender, addr(0xAA));
        assert!(forwarded.data.get("signature_data").is_some());
        assert_eq!(
            outcome,
            DispatchOutcome::ForwardedToRelay {
                payload_hash: forwarded.hash
            }
        );
        assert_ne!(forwarded.hash, vote_envelope().payload_hash());
    }

    #[tokio::test]
    async fn direct_path_skips_relay() {
        let (dispatcher, relay, direct) = dispatcher();

        let outcome = dispatcher
            .dispatch(
                Network::from("eth"),
                TxKind::Propose,
                vote_envelope(),
                RelayMode::DirectChainTx,
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::SubmittedDirect {
                tx_id: "0xtx01".to_string()
            }
        );
        assert!(relay.requests.lock().unwrap().is_empty());
        assert_eq!(direct.payloads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn evm_tx_relay_is_a_direct_submission() {
        let (dispatcher, relay, direct) = dispatcher();
        dispatcher
            .dispatch(
                Network::from("eth"),
                TxKind::Vote,
                vote_envelope(),
                RelayMode::EvmTxRelay,
            )
            .await
            .unwrap();
        assert!(relay.requests.lock().unwrap().is_empty());
        assert_eq!(direct.payloads.lock().unwrap().len(), 1);
    }

    #[test]
    fn pinned_deserializes_from_cid_body() {
        let pinned: Pinned = serde_json::from_str(r#"{"cid":"bafy123"}"#).unwrap();
        assert_eq!(pinned.cid, "bafy123");
    }
}
