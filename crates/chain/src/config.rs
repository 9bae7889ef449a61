//! Tunables for the block builder and chain manager.

/// Limits enforced by [`crate::builder::BlockBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockBuilderConfig {
    /// Maximum transactions a single block may carry.
    pub max_tx_per_block: usize,
    /// Maximum serialised block size, in bytes.
    pub max_block_size: usize,
    /// How far into the future (seconds) a block's timestamp may sit before
    /// `validate` rejects it.
    pub max_future_skew_secs: i64,
}

impl Default for BlockBuilderConfig {
    fn default() -> Self {
        Self {
            max_tx_per_block: 1000,
            max_block_size: 1024 * 1024,
            max_future_skew_secs: 300,
        }
    }
}

/// Tunables for [`crate::chain::ChainManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Maximum reorg depth. Only depth-1 reorgs are actually performed;
    /// this field is retained for forward compatibility and is otherwise
    /// unused, matching the source's own unused configuration knob.
    pub max_reorg_depth: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { max_reorg_depth: 1 }
    }
}
