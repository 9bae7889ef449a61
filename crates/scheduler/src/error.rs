//! Errors for the round-robin scheduler.

use thiserror::Error;
use voting_types::NodeId;

/// Errors from [`crate::scheduler::Scheduler`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The validator manager has no currently active validators.
    #[error("no active validators to schedule")]
    NoActiveValidators,

    /// A caller claimed to be the current validator but isn't.
    #[error("expected current validator {expected}, got {actual}")]
    WrongValidator {
        /// The scheduler's actual current validator.
        expected: NodeId,
        /// The validator the caller claimed to be.
        actual: NodeId,
    },
}
