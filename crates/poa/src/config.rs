//! Tunables for the PoA engine.

/// Configuration for [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoaConfig {
    /// How often the production loop checks whether it's the local node's
    /// turn, in seconds.
    pub block_interval_secs: u64,
    /// Minimum mempool size before a block will be produced.
    pub min_tx_per_block: usize,
    /// Maximum transactions pulled into a single block.
    pub max_tx_per_block: usize,
    /// Mempool capacity.
    pub mempool_capacity: usize,
    /// Capacity of the bounded production-event notification channel.
    pub production_channel_capacity: usize,
}

impl Default for PoaConfig {
    fn default() -> Self {
        Self {
            block_interval_secs: 2,
            min_tx_per_block: 1,
            max_tx_per_block: 1000,
            mempool_capacity: 10_000,
            production_channel_capacity: 100,
        }
    }
}

impl PoaConfig {
    /// Create a config with a custom block interval, everything else default.
    pub fn with_block_interval_secs(block_interval_secs: u64) -> Self {
        Self {
            block_interval_secs,
            ..Default::default()
        }
    }
}
