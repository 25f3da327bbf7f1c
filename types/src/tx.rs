//! Relayed transaction kinds.

use serde::{Deserialize, Serialize};

/// The transaction type a relayed action carries.
///
/// `Execute` and `ExecuteQueuedProposal` cover the post-vote execution
/// calls the relayer submits on behalf of anyone, not just the original
/// signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxKind {
    Propose,
    Vote,
    UpdateProposal,
    Execute,
    ExecuteQueuedProposal,
}
