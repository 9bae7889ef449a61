//! ECDSA signature wrapper.

use std::fmt;

/// A variable-length ECDSA signature.
///
/// The system produces 64-byte fixed-width `r ‖ s` signatures, but the
/// validity predicate accepts the wider range `[64, 72]` to tolerate
/// DER-encoded signatures that may arrive from other components.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Length of the fixed-width `r ‖ s` encoding this system produces.
    pub const FIXED_LEN: usize = 64;

    /// Wrap raw signature bytes without validating them.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Parse a signature from a hex string.
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(hex)?))
    }

    /// Encode as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Get the signature bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// An empty signature, used as a placeholder before signing.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Whether the byte length falls in the valid range `[64, 72]`.
    pub fn is_valid_length(&self) -> bool {
        (64..=72).contains(&self.0.len())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        if hex.len() <= 16 {
            write!(f, "Signature({hex})")
        } else {
            write!(f, "Signature({}..)", &hex[..16])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_length_range() {
        assert!(!Signature::from_bytes(vec![0u8; 63]).is_valid_length());
        assert!(Signature::from_bytes(vec![0u8; 64]).is_valid_length());
        assert!(Signature::from_bytes(vec![0u8; 72]).is_valid_length());
        assert!(!Signature::from_bytes(vec![0u8; 73]).is_valid_length());
    }

    #[test]
    fn hex_roundtrip() {
        let sig = Signature::from_bytes(vec![1u8; 64]);
        assert_eq!(Signature::from_hex(&sig.to_hex()).unwrap(), sig);
    }
}
