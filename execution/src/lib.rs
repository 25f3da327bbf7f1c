//! Execution-strategy encoding.
//!
//! Turns an abstract execution intent (a batch of calls) into the exact
//! parameter blobs a deployed execution-strategy contract expects, plus a
//! deterministic execution hash used both for on-chain replay protection and
//! as the off-chain correlation id. Pure — no I/O.

pub mod encoder;
pub mod error;
pub mod intent;

pub use encoder::{encode, encode_call_batch, EncodedExecution};
pub use error::ExecutionError;
pub use intent::{
    CallOperation, ExecutionCall, ExecutionIntent, ExecutionKind, ExecutionStrategyConfig,
};
