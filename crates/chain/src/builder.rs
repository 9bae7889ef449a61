//! Assembles, validates, and signs blocks.

use std::collections::HashSet;

use voting_crypto::{sign, verify, PrivateKey, PublicKey};
use voting_types::{Block, BlockHeader, Clock, Hash, NodeId, Signature, Timestamp, Transaction};

use crate::canonical;
use crate::config::BlockBuilderConfig;
use crate::error::BuilderError;

/// Builds, validates, and signs blocks under a fixed set of limits.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    config: BlockBuilderConfig,
}

impl BlockBuilder {
    /// Construct a builder with the given limits.
    pub fn new(config: BlockBuilderConfig) -> Self {
        Self { config }
    }

    /// Assemble an unsigned block.
    ///
    /// Rejects an empty transaction list, more than `max_tx_per_block`
    /// transactions, any transaction that fails self-validation, and
    /// duplicate transaction hashes. Computes the Merkle root, stamps the
    /// header with `now` and a random nonce, and leaves `signature` empty.
    pub fn build(
        &self,
        index: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        validator: NodeId,
        clock: &dyn Clock,
    ) -> Result<Block, BuilderError> {
        if transactions.is_empty() {
            return Err(BuilderError::EmptyTransactions);
        }
        if transactions.len() > self.config.max_tx_per_block {
            return Err(BuilderError::TooManyTransactions {
                actual: transactions.len(),
                max: self.config.max_tx_per_block,
            });
        }

        let mut seen = HashSet::with_capacity(transactions.len());
        for tx in &transactions {
            if !tx.is_valid() {
                return Err(BuilderError::InvalidTransaction(tx.hash));
            }
            if !seen.insert(tx.hash) {
                return Err(BuilderError::DuplicateTransaction(tx.hash));
            }
        }

        let leaves: Vec<Vec<u8>> = transactions.iter().map(|tx| tx.canonical_bytes()).collect();
        let merkle_root =
            voting_types::merkle_root(&leaves).expect("non-empty transactions checked above");

        let header = BlockHeader {
            index,
            previous_hash,
            timestamp: clock.now(),
            merkle_root,
            nonce: rand::random(),
            validator,
            signature: Signature::empty(),
        };

        let block = Block {
            header,
            transactions,
        };

        let size = serde_json::to_vec(&block)
            .expect("block serialises")
            .len();
        if size > self.config.max_block_size {
            return Err(BuilderError::BlockTooLarge {
                actual: size,
                max: self.config.max_block_size,
            });
        }

        Ok(block)
    }

    /// Sign `block` in place with `private_key`, over the canonical signing
    /// form (header fields plus reduced transaction refs).
    pub fn sign(&self, block: &mut Block, private_key: &PrivateKey) {
        let bytes = canonical::signing_bytes(&block.header, &block.transactions);
        block.header.signature = sign(&bytes, private_key);
    }

    /// Structural validity: transaction validity, Merkle root match,
    /// timestamp not too far in the future, and size bound. Does not check
    /// chain linkage or the signature (see [`Self::verify_signature`]).
    pub fn validate(&self, block: &Block, clock: &dyn Clock) -> Result<(), BuilderError> {
        if block.transactions.is_empty() {
            return Err(BuilderError::EmptyTransactions);
        }
        if block.transactions.len() > self.config.max_tx_per_block {
            return Err(BuilderError::TooManyTransactions {
                actual: block.transactions.len(),
                max: self.config.max_tx_per_block,
            });
        }

        let mut seen = HashSet::with_capacity(block.transactions.len());
        for tx in &block.transactions {
            if !tx.is_valid() {
                return Err(BuilderError::InvalidTransaction(tx.hash));
            }
            if !seen.insert(tx.hash) {
                return Err(BuilderError::DuplicateTransaction(tx.hash));
            }
        }

        let leaves: Vec<Vec<u8>> = block
            .transactions
            .iter()
            .map(|tx| tx.canonical_bytes())
            .collect();
        let expected_root =
            voting_types::merkle_root(&leaves).expect("non-empty transactions checked above");
        if expected_root != block.header.merkle_root {
            return Err(BuilderError::MerkleMismatch);
        }

        let now = clock.now();
        let skew = std::time::Duration::from_secs(self.config.max_future_skew_secs.max(0) as u64);
        if block.header.timestamp > now.add(skew) {
            return Err(BuilderError::TimestampInFuture);
        }

        let size = serde_json::to_vec(block).expect("block serialises").len();
        if size > self.config.max_block_size {
            return Err(BuilderError::BlockTooLarge {
                actual: size,
                max: self.config.max_block_size,
            });
        }

        Ok(())
    }

    /// Recompute the canonical signing form and verify `block`'s signature
    /// against `public_key`.
    pub fn verify_signature(&self, block: &Block, public_key: &PublicKey) -> bool {
        let bytes = canonical::signing_bytes(&block.header, &block.transactions);
        verify(&bytes, &block.header.signature, public_key)
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new(BlockBuilderConfig::default())
    }
}
