//! Content hash type used for dedup keys and execution identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// A 32-byte content hash (keccak-256 output).
///
/// Serializes as a `0x`-prefixed hex string: hashes travel through JSON
/// request bodies and act as database keys, so the wire form is textual.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse from a `0x`-prefixed 64-digit hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let body = s
            .strip_prefix("0x")
            .ok_or_else(|| TypeError::InvalidHash(s.to_string()))?;
        let bytes = hex::decode(body).map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TypeError::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The low 16 bytes, big-endian (`u128` half used by split-word encodings).
    pub fn low(&self) -> [u8; 16] {
        self.0[16..].try_into().expect("slice is 16 bytes")
    }

    /// The high 16 bytes, big-endian.
    pub fn high(&self) -> [u8; 16] {
        self.0[..16].try_into().expect("slice is 16 bytes")
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ContentHash {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<ContentHash> for String {
    fn from(h: ContentHash) -> Self {
        h.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = ContentHash::new([0xAB; 32]);
        let parsed = ContentHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ContentHash::from_hex("0xabcd").is_err());
        assert!(ContentHash::from_hex("abcd").is_err());
    }

    #[test]
    fn halves_are_big_endian() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x11;
        bytes[31] = 0x22;
        let h = ContentHash::new(bytes);
        assert_eq!(h.high()[0], 0x11);
        assert_eq!(h.low()[15], 0x22);
    }
}
