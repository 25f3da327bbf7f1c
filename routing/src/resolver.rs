//! The authenticator / relay-mode decision procedure.

use serde::{Deserialize, Serialize};

use agora_types::Address;

use crate::error::RouteError;
use crate::strategy::{SigningChain, StrategyConfig};

/// The authentication paths a space can configure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthenticatorKind {
    /// Starknet typed-data signature, relayed on the signer's behalf.
    StarknetSig,
    /// Starknet transaction submitted by the signer's own account.
    StarknetTx,
    /// EVM typed-data signature, forwarded to the relay service.
    EvmSig,
    /// EVM transaction submitted by the signer, bridged to the target chain.
    EvmTx,
}

/// One configured authenticator on a space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorConfig {
    pub address: Address,
    pub kind: AuthenticatorKind,
}

/// What the current wallet session is capable of. Derived per session,
/// never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectorCapabilities {
    /// Contract accounts (multisigs, account abstraction wallets) cannot
    /// produce off-chain signatures a relay can replay.
    pub is_contract_account: bool,
    pub supports_starknet_tx: bool,
    pub supports_evm_sig: bool,
}

/// How the signed action reaches the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelayMode {
    /// Starknet-native signature, relayed; the signer pays no gas.
    StarknetNative,
    /// EVM signature collected locally, execution forwarded to the relay
    /// service; the signer needs no funds on the target chain.
    EvmSigRelay,
    /// The signer submits an EVM transaction; the relay only attests it.
    EvmTxRelay,
    /// The signer's own account submits directly on the target chain.
    DirectChainTx,
}

impl RelayMode {
    /// The chain whose signing scheme the route requires; strategies on any
    /// other chain are unusable for this action. The direct path signs with
    /// whatever the connector natively speaks.
    pub fn signing_chain(&self, connector: &ConnectorCapabilities) -> SigningChain {
        match self {
            Self::StarknetNative => SigningChain::Starknet,
            Self::EvmSigRelay | Self::EvmTxRelay => SigningChain::Evm,
            Self::DirectChainTx => {
                if connector.supports_starknet_tx {
                    SigningChain::Starknet
                } else {
                    SigningChain::Evm
                }
            }
        }
    }
}

/// The resolver's output: consumed immediately by the envelope builder,
/// never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRoute {
    pub relay_mode: RelayMode,
    pub authenticator: Address,
    pub usable_strategies: Vec<StrategyConfig>,
}

fn find(
    authenticators: &[AuthenticatorConfig],
    kind: AuthenticatorKind,
) -> Option<&AuthenticatorConfig> {
    authenticators.iter().find(|a| a.kind == kind)
}

/// Pick the authenticator, relay mode, and usable strategies for one action.
///
/// Priority order, first match wins:
/// 1. Starknet-native connector + Starknet signature authenticator.
/// 2. EVM signature authenticator, if the relayer can fund submission or
///    the account can produce a replayable signature (not a contract).
/// 3. EVM transaction authenticator — the signer's own transaction finality
///    is the guarantee.
/// 4. The account's native transaction path, through whichever
///    authenticator remains configured. Only a space with no
///    authenticators at all is unroutable.
///
/// Strategy filtering preserves the order of `candidates`; indices are
/// on-chain references, so reordering would corrupt past proposals.
pub fn pick(
    authenticators: &[AuthenticatorConfig],
    candidates: &[StrategyConfig],
    connector: &ConnectorCapabilities,
    relayer_has_liquidity: bool,
) -> Result<ResolvedRoute, RouteError> {
    let chosen = if connector.supports_starknet_tx {
        find(authenticators, AuthenticatorKind::StarknetSig)
            .map(|auth| (RelayMode::StarknetNative, auth))
    } else {
        None
    };

    let chosen = chosen.or_else(|| {
        if !connector.supports_evm_sig {
            return None;
        }
        if relayer_has_liquidity || !connector.is_contract_account {
            find(authenticators, AuthenticatorKind::EvmSig)
                .map(|auth| (RelayMode::EvmSigRelay, auth))
        } else {
            None
        }
    });

    let chosen = chosen.or_else(|| {
        if !connector.supports_evm_sig {
            return None;
        }
        find(authenticators, AuthenticatorKind::EvmTx).map(|auth| (RelayMode::EvmTxRelay, auth))
    });

    let chosen = chosen.or_else(|| {
        find(authenticators, AuthenticatorKind::StarknetTx)
            .or_else(|| authenticators.first())
            .map(|auth| (RelayMode::DirectChainTx, auth))
    });

    let (relay_mode, auth) = chosen.ok_or(RouteError::UnsupportedConfiguration)?;

    let signing_chain = relay_mode.signing_chain(connector);
    let usable_strategies = candidates
        .iter()
        .filter(|s| s.chain == signing_chain)
        .cloned()
        .collect();

    Ok(ResolvedRoute {
        relay_mode,
        authenticator: auth.address.clone(),
        usable_strategies,
    })
}
