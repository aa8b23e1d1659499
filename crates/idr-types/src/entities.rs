//! # Core Value Objects
//!
//! Immutable primitives shared by the registry, the crypto layer and tests.

use crate::errors::ValueError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for uint256 payload encoding
pub use primitive_types::U256;

/// A 32-byte hash (Keccak-256 in this workspace).
pub type Hash = [u8; 32];

/// Ledger position (block height). `0` means "never changed".
pub type Position = u64;

/// Ledger time in seconds.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte Ethereum-style address.
///
/// Identities, controllers, delegates and signers all share this shape.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full lowercase `0x`-prefixed hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Accepts `0x`-prefixed or bare hex, any letter case (checksums are not
/// validated).
impl FromStr for Address {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ValueError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).ok_or(ValueError::InvalidLength {
            expected: 20,
            actual: bytes.len(),
        })
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// BYTES32 LABELS
// =============================================================================

/// A 32-byte label: UTF-8 text right-padded with zeros.
///
/// Used for delegate types (`"veriKey"`, `"sigAuth"`, `"attestor"`) and
/// attribute names (`"did/pub/Secp256k1/veriKey/hex"`, `"encryptionKey"`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32(pub [u8; 32]);

/// Delegate type label.
pub type DelegateType = Bytes32;

/// Attribute name label.
pub type AttributeName = Bytes32;

impl Bytes32 {
    /// The all-zero label.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Encodes `text` as a zero-padded label.
    ///
    /// At most 31 bytes fit so the label always ends with a zero byte.
    pub fn from_label(text: &str) -> Result<Self, ValueError> {
        let raw = text.as_bytes();
        if raw.len() > 31 {
            return Err(ValueError::LabelTooLong { len: raw.len() });
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Decodes the label text, or `None` if the bytes are not UTF-8.
    #[must_use]
    pub fn to_label(&self) -> Option<String> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(32);
        if self.0[end..].iter().any(|&b| b != 0) {
            return None;
        }
        String::from_utf8(self.0[..end].to_vec()).ok()
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_label() {
            Some(label) => write!(f, "Bytes32({label:?})"),
            None => write!(f, "Bytes32(0x{})", hex::encode(self.0)),
        }
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_label() {
            Some(label) => f.write_str(&label),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
        let array = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::custom(ValueError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })
        })?;
        Ok(Self(array))
    }
}

/// Left-pads `value` into a big-endian uint256 word.
#[must_use]
pub fn uint256_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    U256::from(value).to_big_endian(&mut word);
    word
}
