//! Errors for the voting-validation predicates.

use thiserror::Error;

/// Errors from [`crate::vote::validate_vote`] and friends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VotingError {
    /// The vote failed its own structural/hash validity check.
    #[error("vote failed self-validation")]
    InvalidVote,

    /// `vote.election_id` does not match the election being checked against.
    #[error("vote targets a different election")]
    WrongElection,

    /// The election does not currently accept votes.
    #[error("election is not open for voting")]
    ElectionNotVotable,

    /// `vote.candidate_id` names no candidate in the election.
    #[error("unknown candidate")]
    UnknownCandidate,

    /// The voter's public key could not be resolved via the key registry.
    #[error("voter identity could not be resolved")]
    UnknownVoter,

    /// The voter's signature does not verify against their registered key.
    #[error("vote signature does not verify")]
    SignatureInvalid,

    /// The voter has already cast `max_votes_per_voter` votes in this election.
    #[error("voter has exceeded max_votes_per_voter")]
    DoubleVote,

    /// The election failed its own structural validity check.
    #[error("election failed self-validation")]
    InvalidElection,

    /// Another election with the same title but a different id already exists.
    #[error("an election with this title already exists")]
    DuplicateElectionTitle,
}
