//! Errors for the PoA engine.

use thiserror::Error;
use voting_types::{Hash, NodeId};

/// Errors from [`crate::engine::Engine`] and [`crate::mempool::Mempool`].
#[derive(Debug, Error)]
pub enum PoaError {
    /// The local node is not an authorised validator.
    #[error("local node {0} is not an authorised validator")]
    NotAuthorised(NodeId),

    /// A proposed block's validator does not match the scheduler's current turn.
    #[error("block validator {actual} is not the current validator {expected}")]
    NotCurrentValidator {
        /// The scheduler's expected current validator.
        expected: NodeId,
        /// The validator claimed by the incoming block.
        actual: NodeId,
    },

    /// An incoming block's signature does not verify.
    #[error("block signature does not verify")]
    SignatureInvalid,

    /// The mempool is at capacity.
    #[error("mempool is full")]
    MempoolFull,

    /// A transaction with this hash is already in the mempool.
    #[error("duplicate transaction {0}")]
    DuplicateTransaction(Hash),

    /// A transaction failed self-validation.
    #[error("transaction {0} failed self-validation")]
    InvalidTransaction(Hash),

    /// The engine's cancellation token was triggered.
    #[error("operation cancelled")]
    Cancelled,

    /// A chain-manager-level failure.
    #[error(transparent)]
    Chain(#[from] voting_chain::ChainError),

    /// A validator-manager-level failure.
    #[error(transparent)]
    Validator(#[from] voting_validator::ValidatorError),

    /// A scheduler-level failure.
    #[error(transparent)]
    Scheduler(#[from] voting_scheduler::SchedulerError),
}
