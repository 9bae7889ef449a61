//! Election definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Hash, NodeId, Timestamp};

/// Lifecycle status of an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStatus {
    /// Created but not yet open for voting.
    Pending,
    /// Open for voting.
    Active,
    /// Voting window has ended.
    Closed,
    /// Cancelled by its creator; never accepts votes.
    Cancelled,
}

/// A candidate standing in an election.
///
/// `vote_count` is a derived projection over committed VOTE transactions,
/// carried here as the value observed at serialisation time rather than
/// recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate identifier, unique within the election.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Derived vote count (not authoritative; recomputed from the chain).
    pub vote_count: u64,
}

/// A voting election definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    /// Unique identifier.
    pub id: Hash,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Ordered candidate list.
    pub candidates: Vec<Candidate>,
    /// Voting window start.
    pub start_time: Timestamp,
    /// Voting window end.
    pub end_time: Timestamp,
    /// Lifecycle status.
    pub status: ElectionStatus,
    /// Creator node id.
    pub created_by: NodeId,
    /// Creation time.
    pub created_at: Timestamp,
    /// Whether anonymous votes are permitted.
    pub allow_anonymous: bool,
    /// Maximum votes a single voter may cast (must be >= 1).
    pub max_votes_per_voter: u32,
}

/// Canonical JSON form, field order frozen for hashing.
#[derive(Serialize)]
struct CanonicalElection<'a> {
    id: String,
    title: &'a str,
    description: &'a str,
    candidates: &'a [Candidate],
    start_time: i64,
    end_time: i64,
    status: ElectionStatus,
    created_by: String,
    created_at: i64,
    allow_anonymous: bool,
    max_votes_per_voter: u32,
}

impl Election {
    /// Canonical bytes for hashing/signing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = CanonicalElection {
            id: self.id.to_hex(),
            title: &self.title,
            description: &self.description,
            candidates: &self.candidates,
            start_time: self.start_time.as_secs(),
            end_time: self.end_time.as_secs(),
            status: self.status,
            created_by: self.created_by.to_hex(),
            created_at: self.created_at.as_secs(),
            allow_anonymous: self.allow_anonymous,
            max_votes_per_voter: self.max_votes_per_voter,
        };
        serde_json::to_vec(&canonical).expect("canonical election serialises")
    }

    /// Structural validity.
    pub fn is_valid(&self) -> bool {
        if self.title.is_empty() {
            return false;
        }
        if self.candidates.len() < 2 {
            return false;
        }
        let mut seen = HashSet::new();
        for candidate in &self.candidates {
            if candidate.id.is_empty() || !seen.insert(candidate.id.as_str()) {
                return false;
            }
        }
        if self.end_time < self.start_time {
            return false;
        }
        if self.created_by.is_empty() {
            return false;
        }
        if self.max_votes_per_voter < 1 {
            return false;
        }
        true
    }

    /// Whether `candidate_id` names a candidate in this election.
    pub fn has_candidate(&self, candidate_id: &str) -> bool {
        self.candidates.iter().any(|c| c.id == candidate_id)
    }

    /// Whether the election currently accepts votes at `now`.
    ///
    /// `CanVote` ≡ in the `[start_time, end_time]` window AND not cancelled.
    pub fn can_vote(&self, now: Timestamp) -> bool {
        if self.status == ElectionStatus::Cancelled {
            return false;
        }
        now >= self.start_time && now <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Election {
        Election {
            id: Hash::from_bytes(b"election"),
            title: "Board Seat".to_string(),
            description: String::new(),
            candidates: vec![
                Candidate {
                    id: "c1".to_string(),
                    name: "Alice".to_string(),
                    description: String::new(),
                    vote_count: 0,
                },
                Candidate {
                    id: "c2".to_string(),
                    name: "Bob".to_string(),
                    description: String::new(),
                    vote_count: 0,
                },
            ],
            start_time: Timestamp::new(0, 0),
            end_time: Timestamp::new(1_000, 0),
            status: ElectionStatus::Active,
            created_by: NodeId::from_bytes(&[1u8; 16]),
            created_at: Timestamp::new(0, 0),
            allow_anonymous: false,
            max_votes_per_voter: 1,
        }
    }

    #[test]
    fn valid_sample() {
        assert!(sample().is_valid());
    }

    #[test]
    fn rejects_single_candidate() {
        let mut e = sample();
        e.candidates.truncate(1);
        assert!(!e.is_valid());
    }

    #[test]
    fn rejects_duplicate_candidate_ids() {
        let mut e = sample();
        e.candidates[1].id = "c1".to_string();
        assert!(!e.is_valid());
    }

    #[test]
    fn rejects_end_before_start() {
        let mut e = sample();
        e.end_time = Timestamp::new(0, 0);
        e.start_time = Timestamp::new(10, 0);
        assert!(!e.is_valid());
    }

    #[test]
    fn can_vote_respects_window_and_cancellation() {
        let mut e = sample();
        assert!(e.can_vote(Timestamp::new(500, 0)));
        assert!(!e.can_vote(Timestamp::new(2_000, 0)));
        e.status = ElectionStatus::Cancelled;
        assert!(!e.can_vote(Timestamp::new(500, 0)));
    }

    #[test]
    fn canonical_bytes_deterministic() {
        let e = sample();
        assert_eq!(e.canonical_bytes(), e.canonical_bytes());
    }
}
