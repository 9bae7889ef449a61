//! Votes cast in an election.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{Hash, NodeId, Signature, Timestamp};

/// A single vote cast by a voter for a candidate in an election.
///
/// When `is_anonymous` is set, `voter_id` is carried for bookkeeping but is
/// omitted from [`Vote::canonical_bytes`], so neither the hash nor the
/// signed message binds the vote to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// `SHA-256(canonical_bytes)`.
    pub id: Hash,
    /// Election this vote belongs to.
    pub election_id: Hash,
    /// Voter identity. Meaningless when `is_anonymous` is true beyond
    /// bookkeeping: it is never hashed or signed over in that case.
    pub voter_id: NodeId,
    /// Chosen candidate.
    pub candidate_id: String,
    /// Cast time.
    pub timestamp: Timestamp,
    /// Signature produced by some valid private key.
    pub signature: Signature,
    /// Whether the voter's identity is unbound from the vote's canonical form.
    pub is_anonymous: bool,
    /// 8 random bytes, hex-encoded, ensuring distinct hashes for otherwise
    /// identical anonymous votes.
    pub nonce: String,
}

/// Canonical JSON form with `voter_id` present, field order frozen for hashing.
#[derive(Serialize)]
struct CanonicalVoteNamed<'a> {
    election_id: String,
    voter_id: String,
    candidate_id: &'a str,
    timestamp: i64,
    is_anonymous: bool,
    nonce: &'a str,
}

/// Canonical JSON form with `voter_id` omitted (anonymous votes).
#[derive(Serialize)]
struct CanonicalVoteAnonymous<'a> {
    election_id: String,
    candidate_id: &'a str,
    timestamp: i64,
    is_anonymous: bool,
    nonce: &'a str,
}

impl Vote {
    /// Generate a fresh random nonce (8 bytes, hex-encoded).
    pub fn random_nonce() -> String {
        let mut bytes = [0u8; 8];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Build an unsealed, unsigned vote.
    pub fn new(
        election_id: Hash,
        voter_id: NodeId,
        candidate_id: String,
        timestamp: Timestamp,
        is_anonymous: bool,
    ) -> Self {
        Self {
            id: Hash::EMPTY,
            election_id,
            voter_id,
            candidate_id,
            timestamp,
            signature: Signature::empty(),
            is_anonymous,
            nonce: Self::random_nonce(),
        }
    }

    /// Canonical bytes for hashing/signing. Contains no occurrence of
    /// `voter_id` when `is_anonymous` is true.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        if self.is_anonymous {
            let canonical = CanonicalVoteAnonymous {
                election_id: self.election_id.to_hex(),
                candidate_id: &self.candidate_id,
                timestamp: self.timestamp.as_secs(),
                is_anonymous: true,
                nonce: &self.nonce,
            };
            serde_json::to_vec(&canonical).expect("canonical vote serialises")
        } else {
            let canonical = CanonicalVoteNamed {
                election_id: self.election_id.to_hex(),
                voter_id: self.voter_id.to_hex(),
                candidate_id: &self.candidate_id,
                timestamp: self.timestamp.as_secs(),
                is_anonymous: false,
                nonce: &self.nonce,
            };
            serde_json::to_vec(&canonical).expect("canonical vote serialises")
        }
    }

    /// Seal: compute and freeze `id = SHA-256(canonical_bytes)`.
    pub fn seal(&mut self) {
        self.id = Hash::from_bytes(&self.canonical_bytes());
    }

    /// Structural validity: sealed hash matches content, and a non-empty
    /// candidate id / non-zero timestamp.
    pub fn is_valid(&self) -> bool {
        if self.candidate_id.is_empty() {
            return false;
        }
        if self.timestamp.is_zero() {
            return false;
        }
        self.id == Hash::from_bytes(&self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_matches_canonical_hash() {
        let mut vote = Vote::new(
            Hash::from_bytes(b"election"),
            NodeId::from_bytes(&[9u8; 16]),
            "c1".to_string(),
            Timestamp::new(10, 0),
            false,
        );
        vote.seal();
        assert!(vote.is_valid());
    }

    #[test]
    fn anonymous_vote_omits_voter_id_bytes() {
        let voter = NodeId::from_bytes(&[0xABu8; 16]);
        let mut vote = Vote::new(
            Hash::from_bytes(b"election"),
            voter,
            "c1".to_string(),
            Timestamp::new(10, 0),
            true,
        );
        vote.seal();
        let bytes = vote.canonical_bytes();
        let as_text = String::from_utf8_lossy(&bytes);
        assert!(!as_text.contains(&voter.to_hex()));
    }

    #[test]
    fn same_nonce_gives_stable_hash() {
        let mut a = Vote::new(
            Hash::from_bytes(b"e"),
            NodeId::from_bytes(&[1u8; 16]),
            "c1".to_string(),
            Timestamp::new(1, 0),
            true,
        );
        a.nonce = "aabbccdd11223344".to_string();
        let mut b = a.clone();
        a.seal();
        b.seal();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn different_nonce_gives_different_hash() {
        let mut a = Vote::new(
            Hash::from_bytes(b"e"),
            NodeId::from_bytes(&[1u8; 16]),
            "c1".to_string(),
            Timestamp::new(1, 0),
            true,
        );
        let mut b = a.clone();
        b.nonce = Vote::random_nonce();
        a.seal();
        b.seal();
        assert_ne!(a.id, b.id);
    }
}
