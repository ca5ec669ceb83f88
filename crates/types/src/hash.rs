//! 32-byte hash type.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Errors from parsing a hex-encoded hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    /// Input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Decoded byte length.
        actual: usize,
    },
}

/// A 32-byte hash.
///
/// Used both for block hashes (opaque values supplied by the chain) and for
/// vote signing hashes, which are produced with [`Hash::fast_hash`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash(#[serde(with = "serde_bytes")] [u8; 32]);

impl Hash {
    /// All-zero hash.
    pub const ZERO: Self = Hash([0u8; 32]);

    /// Wrap raw bytes without hashing them.
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Keccak-256 of `data`, the network's fast hash.
    ///
    /// Every signed vote preimage goes through this function; its output must
    /// never change.
    pub fn fast_hash(data: &[u8]) -> Self {
        let digest = Keccak256::digest(data);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Hash(out)
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let bytes = hex::decode(s).map_err(|e| HexError::InvalidHex(e.to_string()))?;
        let actual = bytes.len();
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| HexError::InvalidLength {
                expected: 32,
                actual,
            })?;
        Ok(Hash(raw))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_hash_is_keccak256() {
        // Keccak-256 of the empty string (pre-NIST padding).
        assert_eq!(
            Hash::fast_hash(b"").to_hex(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_hex_round_trip_and_errors() {
        let h = Hash::fast_hash(b"block");
        assert_eq!(Hash::from_hex(&h.to_hex()), Ok(h));

        assert!(matches!(
            Hash::from_hex("zz"),
            Err(HexError::InvalidHex(_))
        ));
        assert_eq!(
            Hash::from_hex("abcd"),
            Err(HexError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }

    #[test]
    fn test_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!Hash::fast_hash(b"x").is_zero());
    }

    #[test]
    fn test_serde_rejects_wrong_length() {
        let h = Hash::fast_hash(b"block");
        let encoded = bincode::serialize(&h).unwrap();
        assert_eq!(bincode::deserialize::<Hash>(&encoded).unwrap(), h);

        let short = bincode::serialize(&vec![0u8; 31]).unwrap();
        assert!(bincode::deserialize::<Hash>(&short).is_err());
    }
}
