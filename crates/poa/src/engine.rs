//! The PoA engine: wires the chain, validator, scheduler, and penalty
//! components into three concurrent loops.
//!
//! Lock order is enforced structurally rather than by convention: every
//! method here calls into exactly one of `chain`, `validators`, `scheduler`,
//! or `penalties` at a time and never holds a guard from one while calling
//! into another.
//!
//! Every production attempt, successful or not, is reported on a bounded
//! [`ProductionEvent`] channel so an embedding caller can react without
//! scraping logs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use voting_chain::ChainManager;
use voting_crypto::PrivateKey;
use voting_penalty::PenaltySystem;
use voting_scheduler::{RoundEvent, Scheduler};
use voting_types::{Clock, NodeId, Transaction};
use voting_validator::ValidatorManager;

use crate::config::PoaConfig;
use crate::error::PoaError;
use crate::mempool::Mempool;

/// A notification emitted as the production loop produces blocks or fails
/// to.
#[derive(Debug, Clone)]
pub enum ProductionEvent {
    /// A block was produced and appended to the chain.
    Produced(voting_types::Block),
    /// A production attempt failed; carries the error's display text.
    Failed(String),
}

/// Orchestrates block production under Proof-of-Authority.
pub struct Engine {
    node_id: NodeId,
    private_key: PrivateKey,
    chain: Arc<ChainManager>,
    validators: Arc<ValidatorManager>,
    scheduler: Arc<Scheduler>,
    penalties: Arc<PenaltySystem>,
    mempool: Arc<Mempool>,
    clock: Arc<dyn Clock>,
    config: PoaConfig,
    production_events: mpsc::Sender<ProductionEvent>,
}

impl Engine {
    /// Construct an engine for `node_id`, which must already be an
    /// authorised validator. Returns the receiving half of the bounded
    /// production-event channel alongside the engine.
    pub fn new(
        node_id: NodeId,
        private_key: PrivateKey,
        chain: Arc<ChainManager>,
        validators: Arc<ValidatorManager>,
        scheduler: Arc<Scheduler>,
        penalties: Arc<PenaltySystem>,
        clock: Arc<dyn Clock>,
        config: PoaConfig,
    ) -> Result<(Self, mpsc::Receiver<ProductionEvent>), PoaError> {
        if !validators.is_authorised(node_id) {
            return Err(PoaError::NotAuthorised(node_id));
        }
        let (production_events, receiver) = mpsc::channel(config.production_channel_capacity);
        Ok((
            Self {
                node_id,
                private_key,
                chain,
                validators,
                scheduler,
                penalties,
                mempool: Arc::new(Mempool::new(config.mempool_capacity)),
                clock,
                config,
                production_events,
            },
            receiver,
        ))
    }

    /// Submit an externally-received transaction for future inclusion.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<(), PoaError> {
        self.mempool.try_insert(tx)
    }

    /// Validate and append an externally-proposed block.
    ///
    /// Checks, in order: structural/timestamp validity (via the chain
    /// manager's builder), the proposer is an authorised validator, the
    /// proposer is the scheduler's current validator, and the signature
    /// verifies against the proposer's registered public key.
    pub fn accept_proposed_block(&self, block: voting_types::Block) -> Result<(), PoaError> {
        let proposer = block.header.validator;

        if !self.validators.is_authorised(proposer) {
            return Err(PoaError::NotAuthorised(proposer));
        }

        let expected = self.scheduler.current_validator();
        if expected != proposer {
            return Err(PoaError::NotCurrentValidator {
                expected,
                actual: proposer,
            });
        }

        let public_key = self
            .validators
            .get_public_key(proposer)
            .and_then(|bytes| voting_crypto::PublicKey::from_sec1_bytes(&bytes).ok())
            .ok_or(PoaError::SignatureInvalid)?;
        if !self.chain.verify_block_signature(&block, &public_key) {
            return Err(PoaError::SignatureInvalid);
        }

        let committed: Vec<_> = block.transactions.iter().map(|tx| tx.hash).collect();
        self.chain.append(block)?;
        self.mempool.remove_committed(&committed);
        self.scheduler.notify_block_produced(proposer)?;
        Ok(())
    }

    /// Current block height.
    pub fn height(&self) -> u64 {
        self.chain.height()
    }

    /// Run a single production attempt synchronously, returning the
    /// produced block if this node's turn came up and the mempool held
    /// enough transactions. Exposed so callers (and tests) can drive
    /// production without running the async loop.
    pub fn produce_once(&self) -> Result<Option<voting_types::Block>, PoaError> {
        self.try_produce_block()
    }

    /// Run the engine until `cancel` is triggered, driving the production
    /// loop, the round monitor, and a timeout ticker concurrently.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let production = {
            let engine = self.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { engine.run_production_loop(cancel).await })
        };
        let timeout_ticker = {
            let engine = self.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { engine.run_timeout_ticker(cancel).await })
        };

        let _ = tokio::join!(production, timeout_ticker);
    }

    /// Drive the production loop, producing a block whenever it's this
    /// node's turn and the mempool holds enough transactions.
    async fn run_production_loop(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.block_interval_secs));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("production loop cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.try_produce_block() {
                        warn!(%err, "block production attempt failed");
                    }
                }
            }
        }
    }

    /// Drive the round timeout check at a steady cadence.
    async fn run_timeout_ticker(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("timeout ticker cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    self.scheduler.check_timeout();
                }
            }
        }
    }

    fn try_produce_block(&self) -> Result<Option<voting_types::Block>, PoaError> {
        if !self.scheduler.is_my_turn(self.node_id) {
            return Ok(None);
        }
        if self.mempool.len() < self.config.min_tx_per_block {
            return Ok(None);
        }

        let txs = self.mempool.take_up_to(self.config.max_tx_per_block);
        if txs.is_empty() {
            return Ok(None);
        }

        let result = if self.chain.tip().is_none() {
            self.chain.create_genesis(txs.clone(), self.node_id, &self.private_key)
        } else {
            match self.chain.propose(txs.clone(), self.node_id, &self.private_key) {
                Ok(block) => self.chain.append(block.clone()).map(|_| block),
                Err(err) => Err(err),
            }
        };

        match result {
            Ok(block) => {
                debug!(index = block.header.index, "block produced");
                self.scheduler.notify_block_produced(self.node_id)?;
                self.emit(ProductionEvent::Produced(block.clone()));
                Ok(Some(block))
            }
            Err(err) => {
                self.mempool.return_to_front(txs);
                let poa_err: PoaError = err.into();
                self.emit(ProductionEvent::Failed(poa_err.to_string()));
                Err(poa_err)
            }
        }
    }

    fn emit(&self, event: ProductionEvent) {
        if self.production_events.try_send(event).is_err() {
            warn!("production event channel full, dropping notification");
        }
    }

    /// Run the round monitor: drain scheduler events, log them, and
    /// periodically sweep expired penalty records. Intended to be spawned
    /// alongside [`Engine::run`] by callers that hold the scheduler's
    /// receiver (the scheduler is constructed by the caller, who therefore
    /// owns the receiving half of its channel).
    pub async fn run_round_monitor(
        &self,
        mut rounds: mpsc::Receiver<RoundEvent>,
        cancel: CancellationToken,
    ) {
        let mut cleanup = tokio::time::interval(Duration::from_secs(60));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("round monitor cancelled");
                    return;
                }
                event = rounds.recv() => {
                    match event {
                        Some(RoundEvent { round, validator, reason }) => {
                            debug!(round, %validator, ?reason, "round advanced");
                        }
                        None => {
                            error!("scheduler round channel closed");
                            return;
                        }
                    }
                }
                _ = cleanup.tick() => {
                    self.penalties.cleanup_expired();
                }
            }
        }
    }
}
