//! Configured voting/validation strategy slots.

use serde::{Deserialize, Serialize};

use agora_types::Address;

/// Which chain a strategy's parameters are signed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningChain {
    Starknet,
    Evm,
}

/// One configured strategy slot in a space's strategy list.
///
/// `index` is the on-chain slot reference embedded in past proposals and
/// votes; it is assigned once and never reused for a different strategy
/// meaning (see [`StrategySet`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub index: u8,
    pub address: Address,
    pub params: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub chain: SigningChain,
}

/// A space's strategy list with append-only index assignment.
///
/// Slots are positional: appending assigns the next free index, removal
/// leaves a tombstone so the index is retired forever. Reordering is
/// structurally impossible, which is what keeps strategy-index references
/// in historical proposals valid.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StrategySet {
    slots: Vec<Option<StrategyConfig>>,
}

impl StrategySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy, assigning it the next never-used index.
    pub fn append(&mut self, address: Address, params: Vec<u8>,
        metadata: Option<serde_json::Value>, chain: SigningChain) -> u8 {
        let index = self.slots.len() as u8;
        self.slots.push(Some(StrategyConfig {
            index,
            address,
            params,
            metadata,
            chain,
        }));
        index
    }

    /// Retire a slot. The index is never reassigned.
    ///
    /// Returns `false` if the slot does not exist or is already retired.
    pub fn remove(&mut self, index: u8) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Active strategies in slot order.
    pub fn active(&self) -> Vec<StrategyConfig> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Look up an active slot by index.
    pub fn get(&self, index: u8) -> Option<&StrategyConfig> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::parse(format!("0x{:040x}", n)).unwrap()
    }

    #[test]
    fn append_assigns_monotonic_indices() {
        let mut set = StrategySet::new();
        assert_eq!(set.append(addr(1), vec![], None, SigningChain::Starknet), 0);
        assert_eq!(set.append(addr(2), vec![], None, SigningChain::Evm), 1);
        assert_eq!(set.append(addr(3), vec![], None, SigningChain::Starknet), 2);
    }

    #[test]
    fn removal_retires_the_index_forever() {
        let mut set = StrategySet::new();
        set.append(addr(1), vec![], None, SigningChain::Starknet);
        set.append(addr(2), vec![], None, SigningChain::Starknet);
        assert!(set.remove(0));
        assert!(!set.remove(0)); // already retired

        // a re-added strategy gets a fresh index, never slot 0 again
        let idx = set.append(addr(1), vec![], None, SigningChain::Starknet);
        assert_eq!(idx, 2);
        assert!(set.get(0).is_none());

        let active: Vec<u8> = set.active().iter().map(|s| s.index).collect();
        assert_eq!(active, vec![1, 2]);
    }
}
