//! The key-resolution capability non-anonymous vote verification depends on.

use voting_crypto::PublicKey;
use voting_types::NodeId;

/// Resolves a node id to its registered public key. Mandated so
/// non-anonymous vote verification never has to "trust the signature if
/// other checks pass" — the caller always proves who signed.
pub trait KeyRegistry: Send + Sync {
    /// The public key registered for `node`, if any.
    fn public_key_of(&self, node: &NodeId) -> Option<PublicKey>;
}
