//! Authenticator and relay-mode resolution.
//!
//! Given a space's configured authenticators, the signer's connector
//! capabilities, and the relayer's liquidity, decides which authentication
//! path a governance action takes and which of the configured strategies
//! the signer can actually use. Pure decision logic — no I/O.

pub mod error;
pub mod resolver;
pub mod strategy;

pub use error::RouteError;
pub use resolver::{pick, AuthenticatorConfig, AuthenticatorKind, ConnectorCapabilities,
    RelayMode, ResolvedRoute};
pub use strategy::{SigningChain, StrategyConfig, StrategySet};
