//! S4 — round-robin rotation across three validators, insertion order
//! V0, V1, V2, producing five blocks.

use std::sync::Arc;

use voting_chain::{BlockBuilder, BlockBuilderConfig, ChainConfig, ChainManager, InMemoryChainRepository};
use voting_penalty::{PenaltyConfig, PenaltySystem};
use voting_poa::{Engine, PoaConfig};
use voting_scheduler::{Scheduler, SchedulerConfig};
use voting_types::{Clock, FixedClock, NodeId, Timestamp, Transaction, TransactionType};
use voting_validator::{ValidatorManager, ValidatorManagerConfig};

fn tx(seed: u8, now: Timestamp) -> Transaction {
    let mut tx = Transaction::new(
        TransactionType::Election,
        NodeId::from_bytes(&[seed; 16]),
        NodeId::EMPTY,
        vec![seed],
        now,
    );
    tx.seal();
    tx
}

#[test]
fn producers_rotate_in_insertion_order() {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(1_000));
    let now = clock.now();

    let validators = Arc::new(ValidatorManager::new(clock.clone(), ValidatorManagerConfig::default()));
    let mut node_ids = Vec::new();
    let mut engines = Vec::new();

    let chain = Arc::new(
        ChainManager::new(
            Arc::new(InMemoryChainRepository::new()),
            clock.clone(),
            BlockBuilder::new(BlockBuilderConfig::default()),
            ChainConfig::default(),
        )
        .unwrap(),
    );
    for _ in 0..3 {
        let (sk, pk) = voting_crypto::generate_keypair();
        let node_id = voting_crypto::derive_node_id(&pk);
        validators.add(node_id, pk.to_sec1_bytes()).unwrap();
        node_ids.push(node_id);
        engines.push((node_id, sk));
    }

    let (scheduler, _round_rx) = Scheduler::start(validators.clone(), clock.clone(), SchedulerConfig::default()).unwrap();
    let scheduler = Arc::new(scheduler);
    let (penalty_system, _rx) = PenaltySystem::new(clock.clone(), validators.clone(), PenaltyConfig::default());
    let penalties = Arc::new(penalty_system);

    // Genesis from V0.
    let genesis_validator = node_ids[0];
    let genesis_sk = &engines[0].1;
    chain
        .create_genesis(vec![tx(9, now)], genesis_validator, genesis_sk)
        .unwrap();
    scheduler.notify_block_produced(genesis_validator).unwrap();

    let engines: Vec<Engine> = engines
        .into_iter()
        .map(|(node_id, sk)| {
            let (engine, _production_events) = Engine::new(
                node_id,
                sk,
                chain.clone(),
                validators.clone(),
                scheduler.clone(),
                penalties.clone(),
                clock.clone(),
                PoaConfig::default(),
            )
            .unwrap();
            engine
        })
        .collect();

    let mut producers = Vec::new();
    for round_seed in 1..=5u8 {
        for engine in engines.iter() {
            engine.submit_transaction(tx(round_seed.wrapping_add(10), now)).ok();
        }
        let turn = scheduler.current_validator();
        let position = node_ids.iter().position(|id| *id == turn).unwrap();
        let produced = engines[position].produce_once().unwrap();
        assert!(produced.is_some(), "the current validator should always be able to produce");
        producers.push(turn);
    }

    assert_eq!(
        producers,
        vec![node_ids[1], node_ids[2], node_ids[0], node_ids[1], node_ids[2]]
    );
    assert_eq!(scheduler.current_round(), 7);
}
