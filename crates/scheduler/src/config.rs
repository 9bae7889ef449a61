//! Tunables for the round-robin scheduler.

/// Configuration for [`crate::scheduler::Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long a round lasts before it is considered timed out, in seconds.
    pub round_duration_secs: u64,
    /// How long a validator has to respond once selected, in seconds.
    pub timeout_duration_secs: u64,
    /// Capacity of the bounded round-change notification channel.
    pub channel_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            round_duration_secs: 5,
            timeout_duration_secs: 4,
            channel_capacity: 100,
        }
    }
}
