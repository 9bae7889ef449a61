//! The chain manager: append, validate, propose, and fork handling.
//!
//! Exclusively owns the repository handle and the cached tip/height; every
//! mutation goes through its public methods, which serialise themselves
//! behind an internal mutex rather than trusting callers to coordinate.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use voting_crypto::PrivateKey;
use voting_types::{Block, Clock, Hash, NodeId, Transaction};

use crate::builder::BlockBuilder;
use crate::canonical;
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::repository::ChainRepository;

struct State {
    tip: Option<Block>,
    height: u64,
}

/// Owns chain state: the repository, the block builder, and a cached tip.
pub struct ChainManager {
    repository: Arc<dyn ChainRepository>,
    clock: Arc<dyn Clock>,
    builder: BlockBuilder,
    config: ChainConfig,
    state: Mutex<State>,
}

impl ChainManager {
    /// Construct a manager over `repository`, loading any existing tip.
    pub fn new(
        repository: Arc<dyn ChainRepository>,
        clock: Arc<dyn Clock>,
        builder: BlockBuilder,
        config: ChainConfig,
    ) -> Result<Self, ChainError> {
        let tip = repository.get_latest()?;
        let height = repository.get_height()?;
        Ok(Self {
            repository,
            clock,
            builder,
            config,
            state: Mutex::new(State { tip, height }),
        })
    }

    /// The cached tip block, if the chain is non-empty.
    pub fn tip(&self) -> Option<Block> {
        self.state.lock().expect("chain state lock poisoned").tip.clone()
    }

    /// The cached height (one past the tip's index, or 0 if empty).
    pub fn height(&self) -> u64 {
        self.state.lock().expect("chain state lock poisoned").height
    }

    /// Recompute `block`'s canonical signing form and check its signature
    /// against `public_key`.
    pub fn verify_block_signature(&self, block: &Block, public_key: &voting_crypto::PublicKey) -> bool {
        self.builder.verify_signature(block, public_key)
    }

    /// Create and persist the genesis block (index 0, empty `previous_hash`).
    /// Fails if a genesis block already exists.
    pub fn create_genesis(
        &self,
        txs: Vec<Transaction>,
        validator: NodeId,
        private_key: &PrivateKey,
    ) -> Result<Block, ChainError> {
        let mut state = self.state.lock().expect("chain state lock poisoned");
        if state.tip.is_some() {
            return Err(ChainError::GenesisAlreadyExists);
        }

        let mut block = self
            .builder
            .build(0, Hash::EMPTY, txs, validator, self.clock.as_ref())?;
        self.builder.sign(&mut block, private_key);

        self.repository
            .save(&block)
            .map_err(|e| ChainError::Repository(e.to_string()))?;

        info!(index = 0, "genesis block created");
        state.tip = Some(block.clone());
        state.height = 1;
        Ok(block)
    }

    /// Build and sign the next block on top of the cached tip, without
    /// appending it.
    pub fn propose(
        &self,
        txs: Vec<Transaction>,
        validator: NodeId,
        private_key: &PrivateKey,
    ) -> Result<Block, ChainError> {
        let tip = self
            .state
            .lock()
            .expect("chain state lock poisoned")
            .tip
            .clone()
            .ok_or_else(|| ChainError::NotFound("no genesis block yet".to_string()))?;

        let previous_hash = canonical::canonical_hash(&tip);
        let mut block = self.builder.build(
            tip.header.index + 1,
            previous_hash,
            txs,
            validator,
            self.clock.as_ref(),
        )?;
        self.builder.sign(&mut block, private_key);
        Ok(block)
    }

    /// Validate, check connection to the tip, then persist `block`.
    pub fn append(&self, block: Block) -> Result<(), ChainError> {
        self.builder.validate(&block, self.clock.as_ref())?;

        let mut state = self.state.lock().expect("chain state lock poisoned");
        match &state.tip {
            None => {
                if block.header.index != 0 || !block.header.previous_hash.is_empty() {
                    return Err(ChainError::Conflict(
                        "first block must be genesis (index 0, empty previous_hash)".to_string(),
                    ));
                }
            }
            Some(tip) => {
                let expected_previous = canonical::canonical_hash(tip);
                if block.header.index != tip.header.index + 1
                    || block.header.previous_hash != expected_previous
                {
                    return Err(ChainError::Conflict(format!(
                        "block {} does not connect to tip {}",
                        block.header.index, tip.header.index
                    )));
                }
            }
        }

        self.repository
            .save(&block)
            .map_err(|e| ChainError::Repository(e.to_string()))?;
        debug!(index = block.header.index, "block appended");
        state.height = block.header.index + 1;
        state.tip = Some(block);
        Ok(())
    }

    /// Walk every block from 0 to the current height and re-check
    /// structural validity and `previous_hash` linkage.
    pub fn validate_chain(&self) -> Result<(), ChainError> {
        let height = self.height();
        if height == 0 {
            return Err(ChainError::InvalidArgument("chain is empty".to_string()));
        }

        let mut previous: Option<Block> = None;
        for index in 0..height {
            let block = self
                .repository
                .get_by_index(index)?
                .ok_or_else(|| ChainError::NotFound(format!("missing block at index {index}")))?;

            self.builder.validate(&block, self.clock.as_ref())?;

            match &previous {
                None => {
                    if block.header.index != 0 || !block.header.previous_hash.is_empty() {
                        return Err(ChainError::Conflict(
                            "genesis must have index 0 and empty previous_hash".to_string(),
                        ));
                    }
                }
                Some(prev) => {
                    let expected = canonical::canonical_hash(prev);
                    if block.header.previous_hash != expected {
                        return Err(ChainError::Conflict(format!(
                            "block {} does not link to block {}",
                            block.header.index, prev.header.index
                        )));
                    }
                }
            }
            previous = Some(block);
        }
        Ok(())
    }

    /// Resolve a fork between the current tip and `alternative`, which must
    /// share the tip's `(index, previous_hash)`.
    ///
    /// Tie-break: the earlier timestamp wins; if timestamps tie, the block
    /// whose canonical hash sorts lexicographically smaller wins. Only
    /// depth-1 reorgs are supported; anything else is a [`ChainError::Conflict`].
    pub fn handle_fork(&self, alternative: Block) -> Result<(), ChainError> {
        let mut state = self.state.lock().expect("chain state lock poisoned");
        let tip = state
            .tip
            .clone()
            .ok_or_else(|| ChainError::NotFound("no tip to fork from".to_string()))?;

        if alternative.header.index != tip.header.index
            || alternative.header.previous_hash != tip.header.previous_hash
        {
            return Err(ChainError::Conflict(
                "alternative block is not a depth-1 fork of the current tip".to_string(),
            ));
        }

        self.builder.validate(&alternative, self.clock.as_ref())?;

        let tip_hash = canonical::canonical_hash(&tip);
        let alt_hash = canonical::canonical_hash(&alternative);

        let alternative_wins = match alternative.header.timestamp.duration_since(tip.header.timestamp) {
            // alternative is strictly later than tip: tip keeps it.
            Some(d) if !d.is_zero() => false,
            // alternative is strictly earlier: alternative wins outright.
            None => true,
            // exact tie: lexicographically smaller hash wins.
            Some(_) => alt_hash.to_hex() < tip_hash.to_hex(),
        };

        if !alternative_wins {
            return Ok(());
        }

        self.repository
            .delete(&tip_hash)
            .map_err(|e| ChainError::Repository(e.to_string()))?;
        if let Err(e) = self.repository.save(&alternative) {
            // Best effort: restore the original tip if the reorg failed partway.
            warn!("reorg failed, restoring original tip");
            let _ = self.repository.save(&tip);
            return Err(ChainError::Repository(e.to_string()));
        }

        info!(index = alternative.header.index, "chain reorganised");
        state.tip = Some(alternative);
        Ok(())
    }
}
