//! Tunables for the penalty system.

/// Configuration for [`crate::system::PenaltySystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyConfig {
    /// How often the periodic cleanup task runs, in seconds.
    pub cleanup_interval_secs: u64,
    /// Capacity of the bounded notification channel.
    pub notification_channel_capacity: usize,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 60 * 60,
            notification_channel_capacity: 100,
        }
    }
}
