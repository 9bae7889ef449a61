//! Tunables for the validator manager's internal activity penalty.

/// Thresholds governing when repeated inactivity escalates into a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorManagerConfig {
    /// Consecutive missed rounds before an internal penalty is applied.
    pub max_missed_rounds: u32,
    /// Penalty count at which a validator is banned instead of penalized.
    pub max_penalties: u32,
    /// How long a `Penalized` status lasts, in seconds.
    pub penalty_duration_secs: i64,
}

impl Default for ValidatorManagerConfig {
    fn default() -> Self {
        Self {
            max_missed_rounds: 3,
            max_penalties: 5,
            penalty_duration_secs: 24 * 60 * 60,
        }
    }
}
