//! Errors for the validator manager.

use thiserror::Error;
use voting_types::NodeId;

/// Errors from [`crate::manager::ValidatorManager`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// No validator with this node id is registered.
    #[error("validator {0} not found")]
    NotFound(NodeId),

    /// A validator with this node id is already registered.
    #[error("validator {0} already exists")]
    AlreadyExists(NodeId),

    /// A malformed argument was supplied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
