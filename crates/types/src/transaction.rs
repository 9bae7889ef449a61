//! Transactions: the unit of chain-committed application data.

use serde::{Deserialize, Serialize};

use crate::{Hash, NodeId, Signature, Timestamp};

/// The kind of payload a transaction carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// A vote cast in an election.
    Vote,
    /// An election definition or status change.
    Election,
    /// A validator-set change.
    Validator,
}

/// A signed, hash-sealed unit of chain-committed data.
///
/// Once sealed (via [`Transaction::seal`]), `hash` and `id` are frozen and
/// must never be recomputed from a mutated body — any further mutation is
/// a bug in the caller, not something this type guards against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identity of the transaction; equals `hash` once sealed.
    pub id: Hash,
    /// Payload kind.
    pub tx_type: TransactionType,
    /// Sender node id.
    pub from: NodeId,
    /// Recipient node id (may be [`NodeId::EMPTY`] for broadcast-style payloads).
    pub to: NodeId,
    /// Opaque application payload (e.g. encoded Vote or Election bytes).
    pub data: Vec<u8>,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Signature over the sealed hash, produced by `from`'s private key.
    pub signature: Signature,
    /// Hash of the canonical, pre-signature bytes.
    pub hash: Hash,
}

/// Canonical (field-order-frozen) JSON form used only for hashing.
#[derive(Serialize)]
struct CanonicalTransaction {
    tx_type: TransactionType,
    from: String,
    to: String,
    data: String,
    timestamp: i64,
}

impl Transaction {
    /// Build an unsealed transaction (no hash, no signature yet).
    pub fn new(
        tx_type: TransactionType,
        from: NodeId,
        to: NodeId,
        data: Vec<u8>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: Hash::EMPTY,
            tx_type,
            from,
            to,
            data,
            timestamp,
            signature: Signature::empty(),
            hash: Hash::EMPTY,
        }
    }

    /// Compute the canonical bytes used for hashing, independent of `id`,
    /// `hash`, and `signature`.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = CanonicalTransaction {
            tx_type: self.tx_type,
            from: self.from.to_hex(),
            to: self.to.to_hex(),
            data: hex::encode(&self.data),
            timestamp: self.timestamp.as_secs(),
        };
        serde_json::to_vec(&canonical).expect("canonical transaction serialises")
    }

    /// Seal the transaction: compute and freeze `hash` and `id`.
    pub fn seal(&mut self) {
        let hash = Hash::from_bytes(&self.canonical_bytes());
        self.hash = hash;
        self.id = hash;
    }

    /// Attach a signature (over the sealed hash bytes), produced by the caller.
    pub fn attach_signature(&mut self, signature: Signature) {
        self.signature = signature;
    }

    /// Structural and hash-consistency validity.
    pub fn is_valid(&self) -> bool {
        if self.from.is_empty() {
            return false;
        }
        if self.timestamp.is_zero() {
            return false;
        }
        if self.data.is_empty() {
            return false;
        }
        let expected = Hash::from_bytes(&self.canonical_bytes());
        self.hash == expected && self.id == self.hash
    }
}
