//! The single canonical byte encoding used everywhere a block is hashed or
//! signed: the block builder when signing, `verify_signature` when
//! checking, and the chain manager when computing `canonical_hash` for
//! `previous_hash` linkage. There is no second, pipe-delimited form.

use serde::Serialize;

use voting_types::{Block, BlockHeader, Hash, Transaction, TransactionType};

/// A transaction reduced to the fields the block signing form commits to.
#[derive(Serialize)]
struct CanonicalTxRef {
    id: String,
    tx_type: TransactionType,
    from: String,
    to: String,
    timestamp: i64,
    hash: String,
}

impl CanonicalTxRef {
    fn from_tx(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_hex(),
            tx_type: tx.tx_type,
            from: tx.from.to_hex(),
            to: tx.to.to_hex(),
            timestamp: tx.timestamp.as_secs(),
            hash: tx.hash.to_hex(),
        }
    }
}

/// The signing form: everything the validator's signature covers.
#[derive(Serialize)]
struct CanonicalSigningForm {
    index: u64,
    previous_hash: String,
    timestamp: i64,
    merkle_root: String,
    validator: String,
    nonce: u64,
    transactions: Vec<CanonicalTxRef>,
}

/// The full canonical form, additionally including the signature. Hashing
/// this is how `previous_hash` linkage and block identity are defined.
#[derive(Serialize)]
struct CanonicalFullForm {
    index: u64,
    previous_hash: String,
    timestamp: i64,
    merkle_root: String,
    validator: String,
    nonce: u64,
    signature: String,
    transactions: Vec<CanonicalTxRef>,
}

/// Bytes a validator signs over: the header fields plus a reduced
/// transaction list, excluding the (not-yet-computed) signature itself.
pub fn signing_bytes(header: &BlockHeader, transactions: &[Transaction]) -> Vec<u8> {
    let form = CanonicalSigningForm {
        index: header.index,
        previous_hash: header.previous_hash.to_hex(),
        timestamp: header.timestamp.as_secs(),
        merkle_root: header.merkle_root.to_hex(),
        validator: header.validator.to_hex(),
        nonce: header.nonce,
        transactions: transactions.iter().map(CanonicalTxRef::from_tx).collect(),
    };
    serde_json::to_vec(&form).expect("canonical signing form serialises")
}

/// Bytes hashed to produce the canonical block hash (the value later blocks
/// reference via `previous_hash`). Unlike `signing_bytes`, this includes
/// the signature field once it has been populated.
pub fn full_bytes(block: &Block) -> Vec<u8> {
    let form = CanonicalFullForm {
        index: block.header.index,
        previous_hash: block.header.previous_hash.to_hex(),
        timestamp: block.header.timestamp.as_secs(),
        merkle_root: block.header.merkle_root.to_hex(),
        validator: block.header.validator.to_hex(),
        nonce: block.header.nonce,
        signature: block.header.signature.to_hex(),
        transactions: block
            .transactions
            .iter()
            .map(CanonicalTxRef::from_tx)
            .collect(),
    };
    serde_json::to_vec(&form).expect("canonical full form serialises")
}

/// `SHA-256` over the full canonical form, the value subsequent blocks
/// commit to in `previous_hash`.
pub fn canonical_hash(block: &Block) -> Hash {
    Hash::from_bytes(&full_bytes(block))
}
