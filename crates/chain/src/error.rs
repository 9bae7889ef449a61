//! Error types for the block builder and chain manager.

use thiserror::Error;
use voting_types::Hash;

/// Errors from [`crate::builder::BlockBuilder`].
#[derive(Debug, Error)]
pub enum BuilderError {
    /// `build` was called with an empty transaction list.
    #[error("cannot build a block with zero transactions")]
    EmptyTransactions,

    /// The transaction list exceeded `max_tx_per_block`.
    #[error("transaction count {actual} exceeds max_tx_per_block {max}")]
    TooManyTransactions {
        /// Number of transactions supplied.
        actual: usize,
        /// Configured limit.
        max: usize,
    },

    /// A transaction in the block failed self-validation.
    #[error("transaction {0} failed self-validation")]
    InvalidTransaction(Hash),

    /// Two transactions in the same block share a hash.
    #[error("duplicate transaction {0} in block")]
    DuplicateTransaction(Hash),

    /// The serialised block exceeded `max_block_size`.
    #[error("serialised block size {actual} exceeds max_block_size {max}")]
    BlockTooLarge {
        /// Actual serialised size in bytes.
        actual: usize,
        /// Configured limit in bytes.
        max: usize,
    },

    /// The block header's timestamp is too far ahead of the local clock.
    #[error("block timestamp is more than the allowed skew in the future")]
    TimestampInFuture,

    /// The header's `merkle_root` does not match the transactions.
    #[error("merkle root does not match the block's transactions")]
    MerkleMismatch,

    /// The header's signature does not verify against the claimed validator.
    #[error("block signature does not verify")]
    SignatureInvalid,
}

/// Errors from [`crate::chain::ChainManager`].
#[derive(Debug, Error)]
pub enum ChainError {
    /// A block-builder-level validation failure.
    #[error(transparent)]
    Builder(#[from] BuilderError),

    /// `create_genesis` was called on a chain that already has block 0.
    #[error("genesis block already exists")]
    GenesisAlreadyExists,

    /// The requested block does not exist.
    #[error("block not found: {0}")]
    NotFound(String),

    /// A candidate block does not connect to the current tip.
    #[error("block does not connect to the current tip: {0}")]
    Conflict(String),

    /// A malformed argument was supplied (e.g. an invalid range).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing [`crate::repository::ChainRepository`] failed.
    #[error("chain repository error: {0}")]
    Repository(String),
}
