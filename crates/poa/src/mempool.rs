//! A bounded, hash-deduplicated pool of pending transactions.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use voting_types::{Hash, Transaction};

use crate::error::PoaError;

/// FIFO pool of transactions awaiting inclusion in a block.
pub struct Mempool {
    capacity: usize,
    inner: Mutex<Inner>,
}

struct Inner {
    order: VecDeque<Transaction>,
    seen: HashSet<Hash>,
}

impl Mempool {
    /// An empty mempool bounded at `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                seen: HashSet::new(),
            }),
        }
    }

    /// Validate and enqueue `tx`. Rejects a transaction that fails
    /// self-validation, one already present by hash, or any insertion once
    /// the mempool is at capacity.
    pub fn try_insert(&self, tx: Transaction) -> Result<(), PoaError> {
        if !tx.is_valid() {
            return Err(PoaError::InvalidTransaction(tx.hash));
        }
        let mut inner = self.inner.lock().expect("mempool lock poisoned");
        if inner.seen.contains(&tx.hash) {
            return Err(PoaError::DuplicateTransaction(tx.hash));
        }
        if inner.order.len() >= self.capacity {
            return Err(PoaError::MempoolFull);
        }
        inner.seen.insert(tx.hash);
        inner.order.push_back(tx);
        Ok(())
    }

    /// Remove and return up to `n` transactions from the head, in FIFO order.
    pub fn take_up_to(&self, n: usize) -> Vec<Transaction> {
        let mut inner = self.inner.lock().expect("mempool lock poisoned");
        let count = n.min(inner.order.len());
        let mut taken = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(tx) = inner.order.pop_front() {
                inner.seen.remove(&tx.hash);
                taken.push(tx);
            }
        }
        taken
    }

    /// Drop any pending transactions matching `hashes`, e.g. ones just
    /// committed in a block accepted from another validator.
    pub fn remove_committed(&self, hashes: &[Hash]) {
        let mut inner = self.inner.lock().expect("mempool lock poisoned");
        inner.order.retain(|tx| !hashes.contains(&tx.hash));
        for hash in hashes {
            inner.seen.remove(hash);
        }
    }

    /// Reinsert previously-taken transactions at the head, preserving their
    /// relative order, e.g. after a failed production attempt.
    pub fn return_to_front(&self, txs: Vec<Transaction>) {
        let mut inner = self.inner.lock().expect("mempool lock poisoned");
        for tx in txs.into_iter().rev() {
            if inner.seen.insert(tx.hash) {
                inner.order.push_front(tx);
            }
        }
    }

    /// Current number of pending transactions.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("mempool lock poisoned").order.len()
    }

    /// Whether the mempool holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voting_types::{NodeId, Timestamp, TransactionType};

    fn tx(seed: u8) -> Transaction {
        let mut tx = Transaction::new(
            TransactionType::Vote,
            NodeId::from_bytes(&[seed; 16]),
            NodeId::EMPTY,
            vec![seed],
            Timestamp::new(1, 0),
        );
        tx.seal();
        tx
    }

    #[test]
    fn rejects_duplicate_by_hash() {
        let pool = Mempool::new(10);
        pool.try_insert(tx(1)).unwrap();
        let err = pool.try_insert(tx(1)).unwrap_err();
        assert!(matches!(err, PoaError::DuplicateTransaction(_)));
    }

    #[test]
    fn rejects_once_full() {
        let pool = Mempool::new(1);
        pool.try_insert(tx(1)).unwrap();
        let err = pool.try_insert(tx(2)).unwrap_err();
        assert!(matches!(err, PoaError::MempoolFull));
    }

    #[test]
    fn take_up_to_respects_fifo_order() {
        let pool = Mempool::new(10);
        pool.try_insert(tx(1)).unwrap();
        pool.try_insert(tx(2)).unwrap();
        pool.try_insert(tx(3)).unwrap();
        let taken = pool.take_up_to(2);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].hash, tx(1).hash);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn return_to_front_restores_order_and_dedup() {
        let pool = Mempool::new(10);
        pool.try_insert(tx(1)).unwrap();
        pool.try_insert(tx(2)).unwrap();
        let taken = pool.take_up_to(2);
        pool.return_to_front(taken);
        assert_eq!(pool.len(), 2);
        let err = pool.try_insert(tx(1)).unwrap_err();
        assert!(matches!(err, PoaError::DuplicateTransaction(_)));
    }
}
