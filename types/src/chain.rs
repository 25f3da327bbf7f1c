//! Network and chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a relay network partition (e.g. `"eth"`, `"sep"`, `"sn"`,
/// `"sn-sep"`).
///
/// Relay jobs are sharded by network: each worker drains exactly one
/// network's queue, so the id doubles as the partition key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Network(String);

impl Network {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network({})", self.0)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Network {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A numeric chain id (EIP-155 style), used where a precise chain reference
/// is needed rather than a relay partition name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
