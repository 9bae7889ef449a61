//! S1 — genesis with an election, then a vote block produced by the sole
//! validator; the chain validates and the projection counts the vote.

use std::sync::Arc;

use voting_chain::{BlockBuilder, BlockBuilderConfig, ChainConfig, ChainManager, InMemoryChainRepository};
use voting_consensus::{project_vote_counts, validate_vote, KeyRegistry};
use voting_penalty::{PenaltyConfig, PenaltySystem};
use voting_poa::{Engine, PoaConfig};
use voting_scheduler::{Scheduler, SchedulerConfig};
use voting_types::{
    Candidate, Clock, Election, ElectionStatus, FixedClock, Hash, NodeId, Timestamp, Transaction,
    TransactionType, Vote,
};
use voting_validator::{ValidatorManager, ValidatorManagerConfig};

struct SingleKeyRegistry {
    node: NodeId,
    key: voting_crypto::PublicKey,
}

impl KeyRegistry for SingleKeyRegistry {
    fn public_key_of(&self, node: &NodeId) -> Option<voting_crypto::PublicKey> {
        (*node == self.node).then(|| self.key.clone())
    }
}

fn sample_election(created_by: NodeId, now: Timestamp) -> Election {
    Election {
        id: Hash::from_bytes(b"board-seat"),
        title: "Board Seat".to_string(),
        description: String::new(),
        candidates: vec![
            Candidate { id: "c1".to_string(), name: "Alice".to_string(), description: String::new(), vote_count: 0 },
            Candidate { id: "c2".to_string(), name: "Bob".to_string(), description: String::new(), vote_count: 0 },
        ],
        start_time: Timestamp::new(0, 0),
        end_time: Timestamp::new(1_000_000, 0),
        status: ElectionStatus::Active,
        created_by,
        created_at: now,
        allow_anonymous: false,
        max_votes_per_voter: 1,
    }
}

fn payload_tx(tx_type: TransactionType, seed: u8, payload: Vec<u8>, now: Timestamp) -> Transaction {
    let mut tx = Transaction::new(tx_type, NodeId::from_bytes(&[seed; 16]), NodeId::EMPTY, payload, now);
    tx.seal();
    tx
}

#[test]
fn genesis_then_one_vote_block() {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(1_000));
    let now = clock.now();

    let (validator_sk, validator_pk) = voting_crypto::generate_keypair();
    let validator_id = voting_crypto::derive_node_id(&validator_pk);

    let validators = Arc::new(ValidatorManager::new(clock.clone(), ValidatorManagerConfig::default()));
    validators.add(validator_id, validator_pk.to_sec1_bytes()).unwrap();

    let chain = Arc::new(
        ChainManager::new(
            Arc::new(InMemoryChainRepository::new()),
            clock.clone(),
            BlockBuilder::new(BlockBuilderConfig::default()),
            ChainConfig::default(),
        )
        .unwrap(),
    );

    let election = sample_election(validator_id, now);
    assert!(election.is_valid());

    chain
        .create_genesis(
            vec![payload_tx(TransactionType::Election, 1, election.canonical_bytes(), now)],
            validator_id,
            &validator_sk,
        )
        .unwrap();
    assert_eq!(chain.height(), 1);

    let (voter_sk, voter_pk) = voting_crypto::generate_keypair();
    let voter_id = voting_crypto::derive_node_id(&voter_pk);
    let mut vote = Vote::new(election.id, voter_id, "c1".to_string(), now, false);
    vote.seal();
    vote.signature = voting_crypto::sign(&vote.canonical_bytes(), &voter_sk);

    let registry = SingleKeyRegistry { node: voter_id, key: voter_pk };
    validate_vote(&vote, &election, &registry, &[], now).unwrap();

    let vote_transaction = payload_tx(TransactionType::Vote, 2, vote.canonical_bytes(), now);

    let (scheduler, _round_rx) = Scheduler::start(validators.clone(), clock.clone(), SchedulerConfig::default()).unwrap();
    let scheduler = Arc::new(scheduler);
    let (penalty_system, _rx) = PenaltySystem::new(clock.clone(), validators.clone(), PenaltyConfig::default());
    let penalties = Arc::new(penalty_system);

    let (engine, mut production_events) = Engine::new(
        validator_id,
        validator_sk,
        chain.clone(),
        validators.clone(),
        scheduler.clone(),
        penalties,
        clock.clone(),
        PoaConfig::default(),
    )
    .unwrap();

    engine.submit_transaction(vote_transaction).unwrap();
    assert!(scheduler.is_my_turn(validator_id));

    let produced = engine.produce_once().unwrap().expect("block should be produced");
    assert_eq!(produced.header.index, 1);
    assert_eq!(chain.height(), 2);
    assert!(chain.validate_chain().is_ok());
    assert!(matches!(
        production_events.try_recv(),
        Ok(voting_poa::ProductionEvent::Produced(_))
    ));

    let counts = project_vote_counts(&election, &[vote]);
    assert_eq!(
        counts.iter().find(|(id, _)| id == "c1").map(|(_, n)| *n),
        Some(1)
    );
}
