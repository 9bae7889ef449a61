//! S6 — fork tie-break: the earlier timestamp wins; on an exact tie, the
//! block whose canonical hash sorts lexicographically smaller wins.

use std::sync::Arc;

use voting_chain::{BlockBuilder, BlockBuilderConfig, ChainConfig, ChainManager, InMemoryChainRepository};
use voting_types::{Clock, FixedClock, NodeId, Timestamp, Transaction, TransactionType};

fn chain() -> ChainManager {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(1_000));
    ChainManager::new(
        Arc::new(InMemoryChainRepository::new()),
        clock,
        BlockBuilder::new(BlockBuilderConfig::default()),
        ChainConfig::default(),
    )
    .unwrap()
}

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
fn earlier_timestamp_wins_the_fork() {
    let chain = chain();
    let (sk, pk) = voting_crypto::generate_keypair();
    let validator = voting_crypto::derive_node_id(&pk);
    let now = Timestamp::new(1_000, 0);

    chain.create_genesis(vec![tx(1, now)], validator, &sk).unwrap();

    let later = build_and_append_with_timestamp(&chain, &sk, validator, 2, Timestamp::new(1_100, 0));
    let earlier = build_fork_with_timestamp(&chain, &later, &sk, validator, 3, Timestamp::new(1_050, 0));

    chain.handle_fork(earlier.clone()).unwrap();
    assert_eq!(chain.tip().unwrap().header.timestamp, earlier.header.timestamp);
}

#[test]
fn exact_timestamp_tie_breaks_on_smaller_canonical_hash() {
    let chain = chain();
    let (sk, pk) = voting_crypto::generate_keypair();
    let validator = voting_crypto::derive_node_id(&pk);
    let now = Timestamp::new(1_000, 0);

    chain.create_genesis(vec![tx(1, now)], validator, &sk).unwrap();

    let tied_timestamp = Timestamp::new(1_100, 0);
    let first = build_and_append_with_timestamp(&chain, &sk, validator, 2, tied_timestamp);
    let second = build_fork_with_timestamp(&chain, &first, &sk, validator, 3, tied_timestamp);

    let first_hash = voting_chain::canonical_hash(&first).to_hex();
    let second_hash = voting_chain::canonical_hash(&second).to_hex();
    let expected_winner_hash = first_hash.min(second_hash.clone());

    chain.handle_fork(second.clone()).unwrap();
    let winner_hash = voting_chain::canonical_hash(&chain.tip().unwrap()).to_hex();
    assert_eq!(winner_hash, expected_winner_hash);
}

fn build_and_append_with_timestamp(
    chain: &ChainManager,
    sk: &voting_crypto::PrivateKey,
    validator: NodeId,
    seed: u8,
    timestamp: Timestamp,
) -> voting_types::Block {
    let mut block = chain.propose(vec![tx(seed, timestamp)], validator, sk).unwrap();
    block.header.timestamp = timestamp;
    resign(&mut block, sk);
    chain.append(block.clone()).unwrap();
    block
}

fn build_fork_with_timestamp(
    chain: &ChainManager,
    sibling_of: &voting_types::Block,
    sk: &voting_crypto::PrivateKey,
    validator: NodeId,
    seed: u8,
    timestamp: Timestamp,
) -> voting_types::Block {
    let mut block = chain.propose(vec![tx(seed, timestamp)], validator, sk).unwrap();
    block.header.index = sibling_of.header.index;
    block.header.previous_hash = sibling_of.header.previous_hash.clone();
    block.header.timestamp = timestamp;
    resign(&mut block, sk);
    block
}

fn resign(block: &mut voting_types::Block, sk: &voting_crypto::PrivateKey) {
    BlockBuilder::new(BlockBuilderConfig::default()).sign(block, sk);
}
