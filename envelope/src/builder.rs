//! Envelope composition.
//!
//! Pure assembly: the resolved route supplies the authenticator and usable
//! strategies, the execution encoder supplies parameter blobs, and the
//! caller supplies intent. The only real logic is the vote path's
//! by-index re-derivation of per-strategy params.

use agora_execution::{encode, EncodedExecution, ExecutionCall, ExecutionStrategyConfig};
use agora_routing::{ResolvedRoute, StrategyConfig};
use agora_types::{Address, Choice};

use crate::error::EnvelopeError;
use crate::message::{Envelope, ExecutionStrategyRef, Propose, UpdateProposal, Vote};

/// The proposal's stored parallel strategy arrays, as fetched from the
/// indexer: `indices[i]` names the strategy slot whose params sit at
/// `params[i]` and whose parsed metadata sits at `metadata[i]`.
#[derive(Clone, Debug, Default)]
pub struct ProposalStrategyData {
    pub indices: Vec<u8>,
    pub params: Vec<Vec<u8>>,
    pub metadata: Vec<Option<serde_json::Value>>,
}

impl ProposalStrategyData {
    /// Position of a strategy index in the parallel arrays.
    ///
    /// All three arrays must agree; any miss is a data-integrity error and
    /// the action is aborted rather than built from misaligned data.
    fn lookup(&self, index: u8) -> Result<(Vec<u8>, Option<serde_json::Value>), EnvelopeError> {
        let position = self
            .indices
            .iter()
            .position(|&i| i == index)
            .ok_or(EnvelopeError::StrategyIndexMismatch { index })?;
        let params = self
            .params
            .get(position)
            .ok_or(EnvelopeError::StrategyIndexMismatch { index })?
            .clone();
        let metadata = self
            .metadata
            .get(position)
            .ok_or(EnvelopeError::StrategyIndexMismatch { index })?
            .clone();
        Ok((params, metadata))
    }
}

fn encode_execution(
    execution: Option<(&ExecutionStrategyConfig, &[ExecutionCall])>,
) -> Result<(ExecutionStrategyRef, Option<EncodedExecution>), EnvelopeError> {
    match execution {
        Some((config, calls)) => {
            let encoded = encode(
                config.kind,
                &config.address,
                config.destination.as_ref(),
                calls,
            )?;
            let reference =
                ExecutionStrategyRef::from_params(config.address.clone(), &encoded.execution_params);
            Ok((reference, Some(encoded)))
        }
        None => Ok((ExecutionStrategyRef::none(), None)),
    }
}

fn random_salt() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("0x{}", hex::encode(bytes))
}

/// Builds envelopes for each action kind.
pub struct EnvelopeBuilder;

impl EnvelopeBuilder {
    /// Compose a proposal envelope. Returns the encoded execution alongside
    /// so callers can correlate on the execution hash.
    pub fn propose(
        space: Address,
        route: &ResolvedRoute,
        execution: Option<(&ExecutionStrategyConfig, &[ExecutionCall])>,
        metadata_uri: String,
    ) -> Result<(Envelope<Propose>, Option<EncodedExecution>), EnvelopeError> {
        Self::propose_with_salt(space, route, execution, metadata_uri, random_salt())
    }

    /// Like [`Self::propose`] with a caller-chosen salt (tests, replays).
    pub fn propose_with_salt(
        space: Address,
        route: &ResolvedRoute,
        execution: Option<(&ExecutionStrategyConfig, &[ExecutionCall])>,
        metadata_uri: String,
        salt: String,
    ) -> Result<(Envelope<Propose>, Option<EncodedExecution>), EnvelopeError> {
        let (execution_strategy, encoded) = encode_execution(execution)?;
        let data = Propose {
            space,
            authenticator: route.authenticator.clone(),
            strategies: route.usable_strategies.clone(),
            execution_strategy,
            metadata_uri,
            salt,
        };
        Ok((Envelope::unsigned(data), encoded))
    }

    pub fn update_proposal(
        space: Address,
        route: &ResolvedRoute,
        proposal: u64,
        execution: Option<(&ExecutionStrategyConfig, &[ExecutionCall])>,
        metadata_uri: String,
    ) -> Result<(Envelope<UpdateProposal>, Option<EncodedExecution>), EnvelopeError> {
        let (execution_strategy, encoded) = encode_execution(execution)?;
        let data = UpdateProposal {
            space,
            proposal,
            authenticator: route.authenticator.clone(),
            execution_strategy,
            metadata_uri,
        };
        Ok((Envelope::unsigned(data), encoded))
    }

    /// Compose a vote envelope, re-deriving each usable strategy's params
    /// and metadata from the proposal's stored per-strategy data.
    pub fn vote(
        space: Address,
        route: &ResolvedRoute,
        proposal: u64,
        choice: Choice,
        proposal_data: &ProposalStrategyData,
        metadata_uri: String,
    ) -> Result<Envelope<Vote>, EnvelopeError> {
        let mut strategies = Vec::with_capacity(route.usable_strategies.len());
        for strategy in &route.usable_strategies {
            let (params, metadata) = proposal_data.lookup(strategy.index)?;
            strategies.push(StrategyConfig {
                index: strategy.index,
                address: strategy.address.clone(),
                params,
                metadata,
                chain: strategy.chain,
            });
        }

        let data = Vote {
            space,
            authenticator: route.authenticator.clone(),
            strategies,
            proposal,
            choice,
            metadata_uri,
        };
        Ok(Envelope::unsigned(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_execution::{CallOperation, ExecutionKind};
    use agora_routing::{RelayMode, SigningChain};
    use agora_types::ChainId;
    use alloy_primitives::U256;

    fn addr(n: u8) -> Address {
        Address::parse(format!("0x{:040x}", n)).unwrap()
    }

    fn route_with_strategies(indices: &[u8]) -> ResolvedRoute {
        ResolvedRoute {
            relay_mode: RelayMode::EvmSigRelay,
            authenticator: addr(0x02),
            usable_strategies: indices
                .iter()
                .map(|&i| StrategyConfig {
                    index: i,
                    address: addr(0x40 + i),
                    params: vec![i],
                    metadata: None,
                    chain: SigningChain::Evm,
                })
                .collect(),
        }
    }

    fn avatar_config() -> ExecutionStrategyConfig {
        ExecutionStrategyConfig {
            address: addr(0x30),
            kind: ExecutionKind::QuorumAvatar,
            destination: None,
            quorum: U256::from(3u64),
            chain_of_record: ChainId(1),
        }
    }

    fn one_call() -> ExecutionCall {
        ExecutionCall {
            target: addr(0x50),
            value: U256::from(7u64),
            data: vec![1, 2, 3],
            operation: CallOperation::Call,
            salt: U256::from(9u64),
        }
    }

    // ── Propose ─────────────────────────────────────────────────────────

    #[test]
    fn propose_encodes_execution_reference() {
        let route = route_with_strategies(&[0]);
        let calls = [one_call()];
        let config = avatar_config();
        let (envelope, encoded) = EnvelopeBuilder::propose_with_salt(
            addr(0x01),
            &route,
            Some((&config, &calls)),
            "ipfs://meta".to_string(),
            "0x01".to_string(),
        )
        .unwrap();

        let encoded = encoded.unwrap();
        assert_eq!(envelope.data.execution_strategy.address, addr(0x30));
        assert_eq!(envelope.data.execution_strategy.params.len(), 1);
        assert!(envelope.data.execution_strategy.params[0].starts_with("0x"));
        assert!(!encoded.execution_hash.is_zero());
    }

    #[test]
    fn propose_without_execution_uses_none_marker() {
        let route = route_with_strategies(&[0]);
        let (envelope, encoded) = EnvelopeBuilder::propose_with_salt(
            addr(0x01),
            &route,
            None,
            String::new(),
            "0x01".to_string(),
        )
        .unwrap();
        assert!(encoded.is_none());
        assert_eq!(envelope.data.execution_strategy.address, Address::zero());
        assert!(envelope.data.execution_strategy.params.is_empty());
    }

    #[test]
    fn fresh_salts_differ() {
        let route = route_with_strategies(&[]);
        let (a, _) =
            EnvelopeBuilder::propose(addr(0x01), &route, None, String::new()).unwrap();
        let (b, _) =
            EnvelopeBuilder::propose(addr(0x01), &route, None, String::new()).unwrap();
        assert_ne!(a.data.salt, b.data.salt);
    }

    // ── Vote: by-index re-derivation ────────────────────────────────────

    #[test]
    fn vote_rederives_params_by_index() {
        let route = route_with_strategies(&[0, 2]);
        let proposal_data = ProposalStrategyData {
            indices: vec![0, 2],
            params: vec![vec![0xA0], vec![0xA2]],
            metadata: vec![None, Some(serde_json::json!({"decimals": 18}))],
        };

        let envelope = EnvelopeBuilder::vote(
            addr(0x01),
            &route,
            5,
            Choice::For,
            &proposal_data,
            String::new(),
        )
        .unwrap();

        assert_eq!(envelope.data.strategies.len(), 2);
        assert_eq!(envelope.data.strategies[0].params, vec![0xA0]);
        assert_eq!(envelope.data.strategies[1].params, vec![0xA2]);
        assert_eq!(
            envelope.data.strategies[1].metadata,
            Some(serde_json::json!({"decimals": 18}))
        );
    }

    #[test]
    fn vote_aborts_on_index_mismatch() {
        let route = route_with_strategies(&[0, 3]);
        // proposal data knows nothing about index 3
        let proposal_data = ProposalStrategyData {
            indices: vec![0],
            params: vec![vec![0xA0]],
            metadata: vec![None],
        };

        let err = EnvelopeBuilder::vote(
            addr(0x01),
            &route,
            5,
            Choice::Against,
            &proposal_data,
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::StrategyIndexMismatch { index: 3 }
        ));
    }

    #[test]
    fn vote_aborts_on_truncated_parallel_array() {
        let route = route_with_strategies(&[1]);
        // indices claims position 0 holds index 1, but params is empty
        let proposal_data = ProposalStrategyData {
            indices: vec![1],
            params: vec![],
            metadata: vec![None],
        };

        let err = EnvelopeBuilder::vote(
            addr(0x01),
            &route,
            5,
            Choice::Abstain,
            &proposal_data,
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::StrategyIndexMismatch { index: 1 }
        ));
    }
}
