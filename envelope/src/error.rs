use thiserror::Error;

use agora_execution::ExecutionError;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The proposal's parallel strategy arrays disagree about a strategy
    /// index. Data integrity failure: abort rather than guess which array
    /// is right.
    #[error("strategy index {index} missing from the proposal's strategy data")]
    StrategyIndexMismatch { index: u8 },

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("metadata pinning failed: {0}")]
    Pin(String),

    #[error("signing failed: {0}")]
    Sign(String),

    #[error("relay forwarding failed: {0}")]
    Relay(String),

    #[error("direct chain submission failed: {0}")]
    Direct(String),

    /// An envelope reached the forwarding step without a signature. The
    /// dispatch state machine never skips the signing state.
    #[error("envelope is not signed")]
    NotSigned,
}
