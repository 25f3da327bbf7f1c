use thiserror::Error;

use crate::ExecutionKind;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("execution kind {0:?} requires a destination address")]
    MissingDestination(ExecutionKind),
}
