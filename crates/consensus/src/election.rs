//! Election admissibility, and the vote-tally read-model projection.
//!
//! Votes and elections are carried as canonical transactions inside
//! blocks; there is no side index. `project_vote_counts` is how a reader
//! derives tallies on demand from a slice of sealed vote transactions.

use voting_types::{Election, Vote};

use crate::error::VotingError;

/// Check that `election` is self-valid and that no other existing election
/// shares its title under a different id.
pub fn validate_election(election: &Election, existing: &[Election]) -> Result<(), VotingError> {
    if !election.is_valid() {
        return Err(VotingError::InvalidElection);
    }
    let clashes = existing
        .iter()
        .any(|e| e.title == election.title && e.id != election.id);
    if clashes {
        return Err(VotingError::DuplicateElectionTitle);
    }
    Ok(())
}

/// Fold `votes` into per-candidate counts for `election`, in candidate
/// order. Votes targeting a different election, or failing self-validation,
/// are ignored.
pub fn project_vote_counts(election: &Election, votes: &[Vote]) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = election
        .candidates
        .iter()
        .map(|c| (c.id.clone(), 0u64))
        .collect();

    for vote in votes {
        if vote.election_id != election.id || !vote.is_valid() {
            continue;
        }
        if let Some(entry) = counts.iter_mut().find(|(id, _)| *id == vote.candidate_id) {
            entry.1 += 1;
        }
    }

    counts
}
