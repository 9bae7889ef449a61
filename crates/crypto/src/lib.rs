//! ECDSA/P-256 signing, verification, and hashing.
//!
//! Signing hashes the input with SHA-256 first, then signs the 32-byte
//! digest directly (a "prehash" signature) rather than letting the signing
//! primitive re-hash internally, so that `sign`/`verify` and any future
//! cross-language verifier agree on exactly what gets hashed.

use ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as P256Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use sec1::DecodeEcPrivateKey;
use sha2::{Digest, Sha256};

use voting_types::{Hash, NodeId, Signature};

/// A P-256 private (signing) key.
pub struct PrivateKey(SigningKey);

/// A P-256 public (verifying) key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PrivateKey {
    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(VerifyingKey::from(&self.0))
    }

    /// Parse from a PEM-encoded `EC PRIVATE KEY` block.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_sec1_pem(pem).map_err(|_| CryptoError::InvalidEncoding)?;
        Ok(Self(SigningKey::from(secret)))
    }

    /// Parse from a raw hex-encoded scalar.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex).map_err(|_| CryptoError::InvalidEncoding)?;
        let signing_key = SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidCurve)?;
        Ok(Self(signing_key))
    }
}

impl PublicKey {
    /// SEC1 uncompressed point bytes: `0x04 ‖ X ‖ Y` (65 bytes).
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Parse from SEC1-encoded point bytes (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(bytes).map_err(|_| CryptoError::InvalidCurve)?;
        Ok(Self(verifying_key))
    }
}

/// Errors from the crypto service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// The key bytes/PEM were malformed.
    #[error("invalid key encoding")]
    InvalidEncoding,
    /// The key did not decode to a valid point on P-256.
    #[error("invalid curve point")]
    InvalidCurve,
}

/// Generate a fresh P-256 keypair.
pub fn generate_keypair() -> (PrivateKey, PublicKey) {
    let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
    let public = PublicKey(VerifyingKey::from(&signing_key));
    (PrivateKey(signing_key), public)
}

/// SHA-256 the data, then sign the digest. Returns the fixed-width 64-byte
/// `r ‖ s` encoding.
pub fn sign(data: &[u8], private_key: &PrivateKey) -> Signature {
    let digest = Sha256::digest(data);
    let signature: P256Signature = private_key
        .0
        .sign_prehash(&digest)
        .expect("signing a 32-byte prehash never fails");
    Signature::from_bytes(signature.to_bytes().to_vec())
}

/// Verify a signature over `data`. Signatures whose length isn't 64 bytes
/// always fail.
pub fn verify(data: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    if signature.as_bytes().len() != 64 {
        return false;
    }
    let Ok(sig) = P256Signature::from_slice(signature.as_bytes()) else {
        return false;
    };
    let digest = Sha256::digest(data);
    public_key.0.verify_prehash(&digest, &sig).is_ok()
}

/// SHA-256 of `data`.
pub fn hash(data: &[u8]) -> Hash {
    Hash::from_bytes(data)
}

/// Derive a [`NodeId`] as the leading 16 bytes of `SHA-256(X ‖ Y)` over the
/// public key's uncompressed point coordinates.
pub fn derive_node_id(public_key: &PublicKey) -> NodeId {
    let encoded = public_key.0.to_encoded_point(false);
    // Uncompressed SEC1 point is `0x04 ‖ X ‖ Y`; skip the tag byte.
    let xy = &encoded.as_bytes()[1..];
    let digest = Sha256::digest(xy);
    NodeId::from_bytes(&digest[..16])
}
