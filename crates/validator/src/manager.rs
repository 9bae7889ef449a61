//! The authorised validator set: a table keyed by node id, with an
//! insertion-ordered list kept alongside it to derive the round-robin
//! sequence.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use voting_types::{Clock, NodeId, Timestamp, Validator, ValidatorStatus};

use crate::config::ValidatorManagerConfig;
use crate::error::ValidatorError;

/// A snapshot of a validator's activity counters, independent of its
/// authorisation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorStats {
    /// Total rounds this validator has been scheduled for.
    pub total_rounds: u64,
    /// Consecutive missed rounds since the last successful one.
    pub missed_rounds: u32,
    /// Number of penalties ever applied through [`ValidatorManager::update_activity`].
    pub penalty_count: u32,
    /// Last time this validator was observed active.
    pub last_active_at: Timestamp,
}

struct Table {
    by_id: HashMap<NodeId, Validator>,
    order: Vec<NodeId>,
}

/// Owns the validator table exclusively; the PoA engine only ever reaches
/// it through these methods.
pub struct ValidatorManager {
    clock: Arc<dyn Clock>,
    config: ValidatorManagerConfig,
    table: RwLock<Table>,
}

impl ValidatorManager {
    /// An empty manager.
    pub fn new(clock: Arc<dyn Clock>, config: ValidatorManagerConfig) -> Self {
        Self {
            clock,
            config,
            table: RwLock::new(Table {
                by_id: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Register a new, freshly `Active` validator.
    pub fn add(&self, node_id: NodeId, public_key: Vec<u8>) -> Result<(), ValidatorError> {
        let mut table = self.table.write().expect("validator table lock poisoned");
        if table.by_id.contains_key(&node_id) {
            return Err(ValidatorError::AlreadyExists(node_id));
        }
        let validator = Validator::new(node_id, public_key, self.clock.now());
        table.by_id.insert(node_id, validator);
        table.order.push(node_id);
        info!(%node_id, "validator added");
        Ok(())
    }

    /// Remove a validator entirely.
    pub fn remove(&self, node_id: NodeId) -> Result<(), ValidatorError> {
        let mut table = self.table.write().expect("validator table lock poisoned");
        if table.by_id.remove(&node_id).is_none() {
            return Err(ValidatorError::NotFound(node_id));
        }
        table.order.retain(|id| *id != node_id);
        info!(%node_id, "validator removed");
        Ok(())
    }

    /// Fetch a validator's current record.
    pub fn get(&self, node_id: NodeId) -> Option<Validator> {
        let table = self.table.read().expect("validator table lock poisoned");
        table.by_id.get(&node_id).cloned()
    }

    /// All validators, in insertion order.
    pub fn list_all(&self) -> Vec<Validator> {
        let table = self.table.read().expect("validator table lock poisoned");
        table
            .order
            .iter()
            .filter_map(|id| table.by_id.get(id).cloned())
            .collect()
    }

    /// Validators currently active at `now`, in insertion order. Lazily
    /// flips any `Penalized` validator whose expiry has passed.
    pub fn list_active(&self, now: Timestamp) -> Vec<Validator> {
        let mut table = self.table.write().expect("validator table lock poisoned");
        let order = table.order.clone();
        let mut active = Vec::new();
        for id in order {
            if let Some(validator) = table.by_id.get_mut(&id) {
                if validator.is_active(now) {
                    active.push(validator.clone());
                }
            }
        }
        active
    }

    /// Number of registered validators (active or not).
    pub fn count(&self) -> usize {
        self.table.read().expect("validator table lock poisoned").order.len()
    }

    /// Whether `node_id` is a registered, non-banned validator.
    pub fn is_authorised(&self, node_id: NodeId) -> bool {
        self.get(node_id)
            .map(|v| v.status != ValidatorStatus::Banned)
            .unwrap_or(false)
    }

    /// A validator's registered public key (SEC1 uncompressed point bytes).
    pub fn get_public_key(&self, node_id: NodeId) -> Option<Vec<u8>> {
        self.get(node_id).map(|v| v.public_key)
    }

    /// A validator's activity counters.
    pub fn get_stats(&self, node_id: NodeId) -> Option<ValidatorStats> {
        self.get(node_id).map(|v| ValidatorStats {
            total_rounds: v.total_rounds,
            missed_rounds: v.missed_rounds,
            penalty_count: v.penalty_count,
            last_active_at: v.last_active_at,
        })
    }

    /// Whether `node_id` is effectively usable right now (lazily flipping
    /// an expired `Penalized` status to `Active`).
    pub fn is_active(&self, node_id: NodeId) -> Result<bool, ValidatorError> {
        let now = self.clock.now();
        let mut table = self.table.write().expect("validator table lock poisoned");
        let validator = table
            .by_id
            .get_mut(&node_id)
            .ok_or(ValidatorError::NotFound(node_id))?;
        Ok(validator.is_active(now))
    }

    /// Directly set a validator's status (administrative action).
    pub fn set_status(&self, node_id: NodeId, status: ValidatorStatus) -> Result<(), ValidatorError> {
        let mut table = self.table.write().expect("validator table lock poisoned");
        let validator = table
            .by_id
            .get_mut(&node_id)
            .ok_or(ValidatorError::NotFound(node_id))?;
        validator.status = status;
        Ok(())
    }

    /// Put a validator into `Penalized` status until `until`. Used by the
    /// penalty system when a rule's ban duration is finite.
    pub fn set_penalized_until(&self, node_id: NodeId, until: Timestamp) -> Result<(), ValidatorError> {
        let mut table = self.table.write().expect("validator table lock poisoned");
        let validator = table
            .by_id
            .get_mut(&node_id)
            .ok_or(ValidatorError::NotFound(node_id))?;
        validator.status = ValidatorStatus::Penalized;
        validator.penalty_expiry = until;
        Ok(())
    }

    /// Record the outcome of a scheduled round for `node_id`.
    ///
    /// Increments `total_rounds`; on activity, refreshes `last_active_at`
    /// and resets `missed_rounds`; on inactivity, increments `missed_rounds`
    /// and, upon reaching `max_missed_rounds`, applies an internal penalty:
    /// increments `penalty_count`, resets `missed_rounds`, and either bans
    /// the validator (`penalty_count >= max_penalties`) or penalizes it
    /// until `now + penalty_duration`.
    pub fn update_activity(&self, node_id: NodeId, active: bool) -> Result<(), ValidatorError> {
        let now = self.clock.now();
        let mut table = self.table.write().expect("validator table lock poisoned");
        let validator = table
            .by_id
            .get_mut(&node_id)
            .ok_or(ValidatorError::NotFound(node_id))?;

        validator.total_rounds += 1;
        if active {
            validator.last_active_at = now;
            validator.missed_rounds = 0;
            return Ok(());
        }

        validator.missed_rounds += 1;
        if validator.missed_rounds >= self.config.max_missed_rounds {
            validator.penalty_count += 1;
            validator.missed_rounds = 0;
            if validator.penalty_count >= self.config.max_penalties {
                validator.status = ValidatorStatus::Banned;
                warn!(%node_id, "validator banned after repeated missed rounds");
            } else {
                validator.status = ValidatorStatus::Penalized;
                validator.penalty_expiry =
                    now.add(std::time::Duration::from_secs(
                        self.config.penalty_duration_secs.max(0) as u64,
                    ));
                warn!(%node_id, "validator penalized after repeated missed rounds");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voting_types::SystemClock;

    fn manager() -> ValidatorManager {
        ValidatorManager::new(Arc::new(SystemClock), ValidatorManagerConfig::default())
    }

    fn node(byte: u8) -> NodeId {
        NodeId::from_bytes(&[byte; 16])
    }

    #[test]
    fn add_then_get_round_trips() {
        let m = manager();
        m.add(node(1), vec![1, 2, 3]).unwrap();
        let v = m.get(node(1)).unwrap();
        assert_eq!(v.status, ValidatorStatus::Active);
        assert_eq!(m.count(), 1);
    }

    #[test]
    fn add_duplicate_fails() {
        let m = manager();
        m.add(node(1), vec![]).unwrap();
        assert!(matches!(
            m.add(node(1), vec![]),
            Err(ValidatorError::AlreadyExists(_))
        ));
    }

    #[test]
    fn list_active_respects_insertion_order() {
        let m = manager();
        m.add(node(1), vec![]).unwrap();
        m.add(node(2), vec![]).unwrap();
        m.add(node(3), vec![]).unwrap();
        let active = m.list_active(Timestamp::now());
        assert_eq!(
            active.iter().map(|v| v.node_id).collect::<Vec<_>>(),
            vec![node(1), node(2), node(3)]
        );
    }

    #[test]
    fn repeated_missed_rounds_penalizes_then_bans() {
        let config = ValidatorManagerConfig {
            max_missed_rounds: 2,
            max_penalties: 2,
            penalty_duration_secs: 100,
        };
        let m = ValidatorManager::new(Arc::new(SystemClock), config);
        m.add(node(1), vec![]).unwrap();

        m.update_activity(node(1), false).unwrap();
        assert_eq!(m.get(node(1)).unwrap().status, ValidatorStatus::Active);
        m.update_activity(node(1), false).unwrap();
        assert_eq!(m.get(node(1)).unwrap().status, ValidatorStatus::Penalized);

        m.set_status(node(1), ValidatorStatus::Active).unwrap();
        m.update_activity(node(1), false).unwrap();
        m.update_activity(node(1), false).unwrap();
        assert_eq!(m.get(node(1)).unwrap().status, ValidatorStatus::Banned);
    }

    #[test]
    fn is_authorised_false_once_banned() {
        let m = manager();
        m.add(node(1), vec![]).unwrap();
        assert!(m.is_authorised(node(1)));
        m.set_status(node(1), ValidatorStatus::Banned).unwrap();
        assert!(!m.is_authorised(node(1)));
    }
}
