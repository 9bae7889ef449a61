//! Predicates gating whether a vote may be admitted, and audit review of
//! votes already committed to the chain.

use voting_types::{Election, Timestamp, Vote};

use crate::error::VotingError;
use crate::registry::KeyRegistry;

/// Full admissibility check for a vote about to enter the mempool.
///
/// Checks, in order: the vote's own structural validity, that it targets
/// `election`, that the election currently accepts votes, that the chosen
/// candidate exists, and — for non-anonymous votes — that the voter's key
/// resolves, their signature verifies, and they haven't exhausted
/// `max_votes_per_voter`.
///
/// Anonymous votes are exempt from per-voter signature resolution: the
/// system unbinds the voter's identity by design, so there is no key to
/// check the signature against.
pub fn validate_vote(
    vote: &Vote,
    election: &Election,
    key_registry: &dyn KeyRegistry,
    previous_votes_by_this_voter: &[&Vote],
    now: Timestamp,
) -> Result<(), VotingError> {
    check_common(vote, election, key_registry)?;

    if !election.can_vote(now) {
        return Err(VotingError::ElectionNotVotable);
    }

    if !vote.is_anonymous {
        let cast = previous_votes_by_this_voter
            .iter()
            .filter(|v| v.election_id == election.id && !v.is_anonymous)
            .count() as u32;
        if cast >= election.max_votes_per_voter {
            return Err(VotingError::DoubleVote);
        }
    }

    Ok(())
}

/// Same checks as [`validate_vote`], but skipping the voting-window and
/// double-vote checks: an audit reviews votes that were valid when cast,
/// not whether they would still be admissible now.
pub fn validate_vote_for_audit(
    vote: &Vote,
    election: &Election,
    key_registry: &dyn KeyRegistry,
) -> Result<(), VotingError> {
    check_common(vote, election, key_registry)
}

fn check_common(
    vote: &Vote,
    election: &Election,
    key_registry: &dyn KeyRegistry,
) -> Result<(), VotingError> {
    if !vote.is_valid() {
        return Err(VotingError::InvalidVote);
    }
    if vote.election_id != election.id {
        return Err(VotingError::WrongElection);
    }
    if !election.has_candidate(&vote.candidate_id) {
        return Err(VotingError::UnknownCandidate);
    }

    if !vote.is_anonymous {
        let public_key = key_registry
            .public_key_of(&vote.voter_id)
            .ok_or(VotingError::UnknownVoter)?;
        if !voting_crypto::verify(&vote.canonical_bytes(), &vote.signature, &public_key) {
            return Err(VotingError::SignatureInvalid);
        }
    }

    Ok(())
}
