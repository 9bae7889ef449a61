//! Typed penalty records applied to validators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Hash, NodeId, Timestamp};

/// The kind of infraction a penalty record sanctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PenaltyType {
    /// Failed to produce a block during an assigned round.
    MissedRound,
    /// Produced a block that failed validation.
    InvalidBlock,
    /// Signed two conflicting blocks at the same height.
    DoubleSign,
    /// Failed to respond before a round's hard deadline.
    Timeout,
    /// Behaviour outside the above, flagged by an operator or higher-level detector.
    MaliciousBehavior,
}

impl PenaltyType {
    /// Base severity, 1 (lowest) to 4 (highest).
    pub fn severity(&self) -> u8 {
        match self {
            PenaltyType::MissedRound => 1,
            PenaltyType::InvalidBlock => 2,
            PenaltyType::DoubleSign => 4,
            PenaltyType::Timeout => 1,
            PenaltyType::MaliciousBehavior => 4,
        }
    }
}

/// A single applied penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyRecord {
    /// Unique identifier.
    pub id: Hash,
    /// The validator this penalty applies to.
    pub validator_id: NodeId,
    /// Infraction kind.
    pub penalty_type: PenaltyType,
    /// Severity, copied from [`PenaltyType::severity`] at application time.
    pub severity: u8,
    /// Human-readable reason.
    pub reason: String,
    /// When the penalty was applied.
    pub applied_at: Timestamp,
    /// When the penalty stops counting toward thresholds.
    pub expires_at: Timestamp,
    /// Whether this record is still counted (false once expired/cleaned up).
    pub is_active: bool,
    /// Opaque supporting evidence (e.g. conflicting block hashes).
    pub evidence: BTreeMap<String, String>,
}

impl PenaltyRecord {
    /// Whether this record has passed its expiry at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}
