//! Chain address type, `0x`-prefixed hex.
//!
//! Addresses cover both 20-byte EVM accounts and felt-sized Starknet
//! accounts, so the canonical form is a lowercase hex string of at most
//! 32 bytes rather than a fixed-width array.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// A chain address in canonical lowercase `0x`-hex form.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and canonicalize an address string.
    ///
    /// Accepts `0x`-prefixed hex of 1..=32 bytes; the stored form is
    /// lowercased so that equality and map keys behave consistently.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = raw.as_ref();
        let body = raw
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidAddress(raw.to_string()))?;
        if body.is_empty() || body.len() > 64 || body.len() % 2 != 0 {
            return Err(TypeError::InvalidAddress(raw.to_string()));
        }
        if !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the address left-padded into a 32-byte word, as used by the
    /// multi-call execution encoding.
    pub fn to_word(&self) -> [u8; 32] {
        let bytes = hex::decode(&self.0[2..]).expect("canonical form is valid hex");
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(&bytes);
        word
    }

    /// The all-zero EVM address, used as the "no execution strategy" marker.
    pub fn zero() -> Self {
        Self("0x0000000000000000000000000000000000000000".to_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}
