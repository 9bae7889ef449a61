//! Node (validator/voter) identifier.

use std::fmt;

use crate::hash::HexError;

/// A 16-byte node identifier, derived from the leading bytes of a public
/// key's SHA-256 hash (see `voting-crypto::derive_node_id`).
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId([u8; 16]);

impl NodeId {
    /// Size of a node id in bytes.
    pub const BYTES: usize = 16;

    /// The all-zero node id, used as a sentinel "no node" value.
    pub const EMPTY: Self = Self([0u8; 16]);

    /// Wrap raw bytes as a node id.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is not exactly 16 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), 16, "NodeId must be exactly 16 bytes");
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Self(arr)
    }

    /// Parse a node id from a 32-character lowercase hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HexError> {
        if hex.len() != 32 {
            return Err(HexError::InvalidLength {
                expected: 32,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| HexError::InvalidHex)?;
        Ok(Self(bytes))
    }

    /// Encode as a 32-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the bytes as a slice reference.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Check whether this is the empty node id.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}..)", &self.to_hex()[..8])
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
