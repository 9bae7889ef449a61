//! Errors for the penalty system.

use thiserror::Error;
use voting_types::NodeId;

/// Errors from [`crate::system::PenaltySystem`].
#[derive(Debug, Error)]
pub enum PenaltyError {
    /// The target validator does not exist.
    #[error("validator {0} not found")]
    ValidatorNotFound(NodeId),

    /// The validator manager rejected the forwarded status change.
    #[error("validator error: {0}")]
    Validator(#[from] voting_validator::ValidatorError),
}
