//! Block header and block types.

use serde::{Deserialize, Serialize};

use crate::{Hash, NodeId, Signature, Timestamp, Transaction};

/// Consensus metadata for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Position in the chain; genesis is 0.
    pub index: u64,
    /// Canonical hash of the preceding block (or [`Hash::EMPTY`] for genesis).
    pub previous_hash: Hash,
    /// Proposal time.
    pub timestamp: Timestamp,
    /// Merkle root over the canonical bytes of `transactions`, in order.
    pub merkle_root: Hash,
    /// Anti-grinding nonce, chosen at build time.
    pub nonce: u64,
    /// Proposing validator.
    pub validator: NodeId,
    /// ECDSA signature over the canonical signing form (see `voting-chain::canonical`).
    pub signature: Signature,
}

/// A block: header plus the ordered transaction list it commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Consensus header.
    pub header: BlockHeader,
    /// Committed transactions, in inclusion order.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Block height (alias for `header.index`).
    pub fn index(&self) -> u64 {
        self.header.index
    }

    /// Whether this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.header.index == 0
    }

    /// Number of committed transactions.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Whether a transaction with the given hash is committed in this block.
    pub fn contains_transaction(&self, hash: &Hash) -> bool {
        self.transactions.iter().any(|tx| &tx.hash == hash)
    }
}
