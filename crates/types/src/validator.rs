//! Validator bookkeeping record.

use serde::{Deserialize, Serialize};

use crate::{NodeId, Timestamp};

/// Authorisation/health status of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorStatus {
    /// Eligible to produce blocks and counted in the round-robin set.
    Active,
    /// Administratively disabled; never selected.
    Inactive,
    /// Temporarily suspended until `penalty_expiry`.
    Penalized,
    /// Permanently disabled.
    Banned,
}

/// A validator's authorisation and activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Validator identity.
    pub node_id: NodeId,
    /// SEC1-encoded public key bytes (uncompressed point).
    pub public_key: Vec<u8>,
    /// Current status.
    pub status: ValidatorStatus,
    /// When this validator was added to the set.
    pub added_at: Timestamp,
    /// Last time this validator was observed active.
    pub last_active_at: Timestamp,
    /// Consecutive missed rounds since the last successful one.
    pub missed_rounds: u32,
    /// Total rounds this validator has been scheduled for.
    pub total_rounds: u64,
    /// Number of penalties ever applied.
    pub penalty_count: u32,
    /// When a `Penalized` status automatically lifts back to `Active`.
    pub penalty_expiry: Timestamp,
}

impl Validator {
    /// Construct a freshly-added, active validator.
    pub fn new(node_id: NodeId, public_key: Vec<u8>, now: Timestamp) -> Self {
        Self {
            node_id,
            public_key,
            status: ValidatorStatus::Active,
            added_at: now,
            last_active_at: now,
            missed_rounds: 0,
            total_rounds: 0,
            penalty_count: 0,
            penalty_expiry: Timestamp::ZERO,
        }
    }

    /// Whether this validator is effectively usable at `now`.
    ///
    /// A `Penalized` validator whose expiry has passed lazily flips to
    /// `Active` as a side effect of this check.
    pub fn is_active(&mut self, now: Timestamp) -> bool {
        match self.status {
            ValidatorStatus::Active => true,
            ValidatorStatus::Penalized => {
                if now > self.penalty_expiry {
                    self.status = ValidatorStatus::Active;
                    true
                } else {
                    false
                }
            }
            ValidatorStatus::Inactive | ValidatorStatus::Banned => false,
        }
    }
}
