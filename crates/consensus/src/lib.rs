//! Voting-validation predicates: what makes a vote or election admissible,
//! and the audit/projection paths over already-committed ones.

mod election;
mod error;
mod registry;
mod vote;

pub use election::{project_vote_counts, validate_election};
pub use error::VotingError;
pub use registry::KeyRegistry;
pub use vote::{validate_vote, validate_vote_for_audit};
