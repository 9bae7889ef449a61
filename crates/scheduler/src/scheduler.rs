//! Round-robin selection of the current block producer.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info};

use voting_types::{Clock, NodeId, Timestamp};
use voting_validator::ValidatorManager;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;

/// Why a round advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// The current validator produced a block.
    BlockProduced,
    /// An operator manually advanced the round.
    Manual,
    /// The round's timer elapsed with no block produced.
    RoundTimeout,
    /// The current validator was explicitly reported as timed out.
    ValidatorTimeout,
}

/// Emitted on every round change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEvent {
    /// The new round number.
    pub round: u64,
    /// The newly-selected current validator.
    pub validator: NodeId,
    /// Why the round advanced.
    pub reason: AdvanceReason,
}

struct State {
    snapshot: Vec<NodeId>,
    index: usize,
    current_round: u64,
    current_validator: NodeId,
    round_start_time: Timestamp,
}

/// Selects the current block producer from the validator manager's active
/// set, round-robin, in insertion order.
pub struct Scheduler {
    validators: Arc<ValidatorManager>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    state: Mutex<State>,
    sender: mpsc::Sender<RoundEvent>,
}

impl Scheduler {
    /// Build a scheduler and start its first round from the validator
    /// manager's current active set. Fails if that set is empty.
    pub fn start(
        validators: Arc<ValidatorManager>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Result<(Self, mpsc::Receiver<RoundEvent>), SchedulerError> {
        let now = clock.now();
        let snapshot: Vec<NodeId> = validators
            .list_active(now)
            .into_iter()
            .map(|v| v.node_id)
            .collect();
        if snapshot.is_empty() {
            return Err(SchedulerError::NoActiveValidators);
        }

        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let current_validator = snapshot[0];
        let scheduler = Self {
            validators,
            clock,
            config,
            state: Mutex::new(State {
                snapshot,
                index: 0,
                current_round: 1,
                current_validator,
                round_start_time: now,
            }),
            sender,
        };
        Ok((scheduler, receiver))
    }

    /// The validator whose turn it currently is.
    pub fn current_validator(&self) -> NodeId {
        self.state.lock().expect("scheduler lock poisoned").current_validator
    }

    /// The current round number.
    pub fn current_round(&self) -> u64 {
        self.state.lock().expect("scheduler lock poisoned").current_round
    }

    /// Whether `node_id` is the current validator.
    pub fn is_my_turn(&self, node_id: NodeId) -> bool {
        self.current_validator() == node_id
    }

    /// Called by the validator who just produced a block for the current
    /// round. Fails if `node_id` wasn't the current validator.
    pub fn notify_block_produced(&self, node_id: NodeId) -> Result<(), SchedulerError> {
        self.require_current(node_id)?;
        self.advance(AdvanceReason::BlockProduced);
        Ok(())
    }

    /// Called when the current validator is reported as having timed out.
    pub fn handle_timeout(&self, node_id: NodeId) -> Result<(), SchedulerError> {
        self.require_current(node_id)?;
        self.advance(AdvanceReason::ValidatorTimeout);
        Ok(())
    }

    /// Run by a 1 Hz tick: if the round has run longer than
    /// `round_duration`, advance with `RoundTimeout`.
    pub fn check_timeout(&self) {
        let now = self.clock.now();
        let elapsed = {
            let state = self.state.lock().expect("scheduler lock poisoned");
            now.duration_since(state.round_start_time)
        };
        let round_duration = std::time::Duration::from_secs(self.config.round_duration_secs);
        if elapsed.map(|d| d > round_duration).unwrap_or(false) {
            self.advance(AdvanceReason::RoundTimeout);
        }
    }

    fn require_current(&self, node_id: NodeId) -> Result<(), SchedulerError> {
        let expected = self.current_validator();
        if expected != node_id {
            return Err(SchedulerError::WrongValidator {
                expected,
                actual: node_id,
            });
        }
        Ok(())
    }

    fn advance(&self, reason: AdvanceReason) {
        let now = self.clock.now();
        let mut state = self.state.lock().expect("scheduler lock poisoned");
        let outgoing = state.current_validator;

        let became_active = matches!(reason, AdvanceReason::BlockProduced | AdvanceReason::Manual);
        let _ = self.validators.update_activity(outgoing, became_active);

        let snapshot: Vec<NodeId> = self
            .validators
            .list_active(now)
            .into_iter()
            .map(|v| v.node_id)
            .collect();

        let base_index = snapshot.iter().position(|id| *id == outgoing).unwrap_or(0);
        let next_index = if snapshot.is_empty() {
            0
        } else {
            (base_index + 1) % snapshot.len()
        };

        state.snapshot = snapshot;
        state.index = next_index;
        state.current_validator = state
            .snapshot
            .get(next_index)
            .copied()
            .unwrap_or(NodeId::EMPTY);
        state.current_round += 1;
        state.round_start_time = now;

        let event = RoundEvent {
            round: state.current_round,
            validator: state.current_validator,
            reason,
        };
        drop(state);

        debug!(round = event.round, validator = %event.validator, ?reason, "round advanced");
        if self.sender.try_send(event).is_err() {
            info!("round event channel full, dropping notification");
        }
    }
}
