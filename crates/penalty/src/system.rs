//! A typed store of penalty records plus a per-validator index, wired to
//! the validator manager so thresholds translate into real sanctions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use rand::RngCore;
use tokio::sync::mpsc;
use tracing::{info, warn};

use voting_types::{Clock, Hash, NodeId, PenaltyRecord, PenaltyType, Timestamp};
use voting_validator::ValidatorManager;

use crate::config::PenaltyConfig;
use crate::error::PenaltyError;
use crate::rules::{default_rules, PenaltyRule};

/// A notification emitted as penalty records are applied or expire.
#[derive(Debug, Clone)]
pub enum PenaltyEvent {
    /// A new penalty was recorded and, if it crossed the threshold, forwarded
    /// to the validator manager as a status change.
    Applied(PenaltyRecord),
    /// A previously active record has expired and been deactivated.
    Expired(PenaltyRecord),
}

/// Owns the penalty record store and the rule table.
pub struct PenaltySystem {
    clock: Arc<dyn Clock>,
    validators: Arc<ValidatorManager>,
    rules: HashMap<PenaltyType, PenaltyRule>,
    records: RwLock<HashMap<NodeId, Vec<PenaltyRecord>>>,
    sender: mpsc::Sender<PenaltyEvent>,
}

impl PenaltySystem {
    /// Construct a system with the default rule table, returning the
    /// receiving half of its bounded notification channel.
    pub fn new(
        clock: Arc<dyn Clock>,
        validators: Arc<ValidatorManager>,
        config: PenaltyConfig,
    ) -> (Self, mpsc::Receiver<PenaltyEvent>) {
        let (sender, receiver) = mpsc::channel(config.notification_channel_capacity);
        (
            Self {
                clock,
                validators,
                rules: default_rules(),
                records: RwLock::new(HashMap::new()),
                sender,
            },
            receiver,
        )
    }

    fn random_id() -> Hash {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Hash::from_bytes(&bytes)
    }

    /// Apply a penalty of `penalty_type` to `validator_id`. Creates a record
    /// expiring at `now + rule.duration`; if the active-record count for
    /// this type reaches `rule.max_count`, forwards a ban (permanent if
    /// `ban_duration == 0`) or a timed penalization to the validator
    /// manager.
    pub fn apply(
        &self,
        validator_id: NodeId,
        penalty_type: PenaltyType,
        reason: String,
        evidence: BTreeMap<String, String>,
    ) -> Result<PenaltyRecord, PenaltyError> {
        let rule = self.rules[&penalty_type];
        let now = self.clock.now();

        let record = PenaltyRecord {
            id: Self::random_id(),
            validator_id,
            penalty_type,
            severity: rule.severity,
            reason,
            applied_at: now,
            expires_at: now.add(std::time::Duration::from_secs(rule.duration_secs.max(0) as u64)),
            is_active: true,
            evidence,
        };

        let mut records = self.records.write().expect("penalty store lock poisoned");
        let entry = records.entry(validator_id).or_default();
        entry.push(record.clone());
        let active_count = entry
            .iter()
            .filter(|r| r.penalty_type == penalty_type && r.is_active)
            .count() as u32;
        drop(records);

        if active_count >= rule.max_count {
            if rule.ban_duration_secs == 0 {
                self.validators
                    .set_status(validator_id, voting_types::ValidatorStatus::Banned)?;
                warn!(%validator_id, ?penalty_type, "validator permanently banned");
            } else {
                let until = now.add(std::time::Duration::from_secs(
                    rule.ban_duration_secs.max(0) as u64,
                ));
                self.validators.set_penalized_until(validator_id, until)?;
                warn!(%validator_id, ?penalty_type, "validator penalized");
            }
        }

        info!(%validator_id, ?penalty_type, "penalty applied");
        let _ = self.sender.try_send(PenaltyEvent::Applied(record.clone()));
        Ok(record)
    }

    /// Deactivate every expired-but-still-active record, emitting an
    /// `Expired` notification for each.
    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        let mut records = self.records.write().expect("penalty store lock poisoned");
        for validator_records in records.values_mut() {
            for record in validator_records.iter_mut() {
                if record.is_active && record.is_expired(now) {
                    record.is_active = false;
                    let _ = self.sender.try_send(PenaltyEvent::Expired(record.clone()));
                }
            }
        }
    }

    /// All records (active and inactive) for a validator.
    pub fn records_for(&self, validator_id: NodeId) -> Vec<PenaltyRecord> {
        self.records
            .read()
            .expect("penalty store lock poisoned")
            .get(&validator_id)
            .cloned()
            .unwrap_or_default()
    }

    fn active_count(&self, validator_id: NodeId, now: Timestamp) -> u32 {
        self.records
            .read()
            .expect("penalty store lock poisoned")
            .get(&validator_id)
            .map(|records| records.iter().filter(|r| r.is_active && !r.is_expired(now)).count() as u32)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voting_types::SystemClock;
    use voting_validator::ValidatorManagerConfig;

    fn system() -> (PenaltySystem, Arc<ValidatorManager>, mpsc::Receiver<PenaltyEvent>) {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let validators = Arc::new(ValidatorManager::new(
            clock.clone(),
            ValidatorManagerConfig::default(),
        ));
        let (system, receiver) = PenaltySystem::new(clock, validators.clone(), PenaltyConfig::default());
        (system, validators, receiver)
    }

    fn node(byte: u8) -> NodeId {
        NodeId::from_bytes(&[byte; 16])
    }

    #[tokio::test]
    async fn apply_below_threshold_leaves_validator_active() {
        let (system, validators, mut rx) = system();
        validators.add(node(1), vec![]).unwrap();

        system
            .apply(node(1), PenaltyType::Timeout, "slow".to_string(), BTreeMap::new())
            .unwrap();

        assert_eq!(
            validators.get(node(1)).unwrap().status,
            voting_types::ValidatorStatus::Active
        );
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn reaching_max_count_bans_when_ban_duration_zero() {
        let (system, validators, _rx) = system();
        validators.add(node(1), vec![]).unwrap();

        system
            .apply(
                node(1),
                PenaltyType::MaliciousBehavior,
                "evidence".to_string(),
                BTreeMap::new(),
            )
            .unwrap();

        assert_eq!(
            validators.get(node(1)).unwrap().status,
            voting_types::ValidatorStatus::Banned
        );
    }

    #[tokio::test]
    async fn reaching_max_count_penalizes_when_ban_duration_set() {
        let (system, validators, _rx) = system();
        validators.add(node(1), vec![]).unwrap();

        for _ in 0..5 {
            system
                .apply(node(1), PenaltyType::MissedRound, "missed".to_string(), BTreeMap::new())
                .unwrap();
        }

        assert_eq!(
            validators.get(node(1)).unwrap().status,
            voting_types::ValidatorStatus::Penalized
        );
    }

    #[tokio::test]
    async fn active_count_excludes_expired_records() {
        let (system, validators, _rx) = system();
        validators.add(node(1), vec![]).unwrap();
        system
            .apply(node(1), PenaltyType::Timeout, "slow".to_string(), BTreeMap::new())
            .unwrap();
        assert_eq!(system.active_count(node(1), Timestamp::now()), 1);
        let far_future = Timestamp::now().add(std::time::Duration::from_secs(10_000_000));
        assert_eq!(system.active_count(node(1), far_future), 0);
    }
}
