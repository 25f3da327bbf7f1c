//! Per-variant execution parameter encoding.
//!
//! The multi-call batch layout is fixed: for each call,
//! `target (32, left-padded) ‖ value (32, big-endian) ‖ operation (1) ‖
//! salt (32, big-endian) ‖ data length (4, big-endian) ‖ data`.
//! Encoding the same batch twice yields byte-identical output; the batch
//! digest is the dedup key downstream and the replay-protection key
//! on-chain, so determinism here is load-bearing.

use sha3::{Digest, Keccak256};

use agora_types::{Address, ContentHash};

use crate::error::ExecutionError;
use crate::intent::{ExecutionCall, ExecutionKind};

/// Result of encoding an execution intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedExecution {
    /// Parameter blobs in the order the strategy contract expects them.
    pub execution_params: Vec<Vec<u8>>,
    /// keccak-256 over the encoded call batch. Doubles as the off-chain
    /// correlation id returned to the caller.
    pub execution_hash: ContentHash,
    /// For cross-chain variants: the payload later consumed by the
    /// destination chain's `executeQueuedProposal` step.
    pub queued_payload: Option<Vec<u8>>,
}

/// Serialize a call batch into the fixed multi-call layout.
pub fn encode_call_batch(calls: &[ExecutionCall]) -> Vec<u8> {
    let mut buf = Vec::new();
    for call in calls {
        buf.extend_from_slice(&call.target.to_word());
        buf.extend_from_slice(&call.value.to_be_bytes::<32>());
        buf.push(call.operation.as_u8());
        buf.extend_from_slice(&call.salt.to_be_bytes::<32>());
        buf.extend_from_slice(&(call.data.len() as u32).to_be_bytes());
        buf.extend_from_slice(&call.data);
    }
    buf
}

fn keccak256(bytes: &[u8]) -> ContentHash {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(out.as_slice());
    ContentHash::new(digest)
}

/// Encode an execution intent for a specific strategy variant.
///
/// An empty call batch is valid: it encodes to an empty byte string whose
/// digest is still computed (a no-op execution).
pub fn encode(
    kind: ExecutionKind,
    _strategy: &Address,
    destination: Option<&Address>,
    calls: &[ExecutionCall],
) -> Result<EncodedExecution, ExecutionError> {
    let batch = encode_call_batch(calls);
    let execution_hash = keccak256(&batch);

    match kind {
        // These variants execute on the chain of record: the strategy
        // contract receives the batch itself and re-derives the hash.
        ExecutionKind::QuorumAvatar
        | ExecutionKind::QuorumTimelock
        | ExecutionKind::Axiom
        | ExecutionKind::Isokratia => Ok(EncodedExecution {
            execution_params: vec![batch],
            execution_hash,
            queued_payload: None,
        }),

        // The calls run on a different chain. The origin-chain contract only
        // sees a placeholder (destination + hash split into u128 halves);
        // the real batch travels separately as the queued payload.
        ExecutionKind::EthRelayer => {
            let destination = destination
                .ok_or(ExecutionError::MissingDestination(ExecutionKind::EthRelayer))?;
            let execution_params = vec![
                destination.to_word().to_vec(),
                execution_hash.low().to_vec(),
                execution_hash.high().to_vec(),
            ];
            Ok(EncodedExecution {
                execution_params,
                execution_hash,
                queued_payload: Some(batch),
            })
        }

        ExecutionKind::None => Ok(EncodedExecution {
            execution_params: Vec::new(),
            execution_hash,
            queued_payload: None,
        }),
    }
}
