//! Vote choice enum.

use serde::{Deserialize, Serialize};

/// The three-way vote choice, with the on-chain numeric encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Against,
    For,
    Abstain,
}

impl Choice {
    /// The numeric encoding contracts expect: against=0, for=1, abstain=2.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Against => 0,
            Self::For => 1,
            Self::Abstain => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_encoding_is_stable() {
        assert_eq!(Choice::Against.as_u8(), 0);
        assert_eq!(Choice::For.as_u8(), 1);
        assert_eq!(Choice::Abstain.as_u8(), 2);
    }
}
