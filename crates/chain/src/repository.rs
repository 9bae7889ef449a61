//! Abstract chain storage, and an in-memory reference implementation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use voting_types::{Block, Hash};

use crate::error::ChainError;

/// The only storage capability the chain engine depends on. Implementations
/// must provide atomic save/delete with respect to concurrent readers.
pub trait ChainRepository: Send + Sync {
    /// Persist `block`, indexed by both hash and index.
    fn save(&self, block: &Block) -> Result<(), ChainError>;
    /// Look up a block by its canonical hash.
    fn get_by_hash(&self, hash: &Hash) -> Result<Option<Block>, ChainError>;
    /// Look up a block by its index.
    fn get_by_index(&self, index: u64) -> Result<Option<Block>, ChainError>;
    /// The highest-index block, if any.
    fn get_latest(&self) -> Result<Option<Block>, ChainError>;
    /// Number of blocks stored (one past the highest index, or 0 if empty).
    fn get_height(&self) -> Result<u64, ChainError>;
    /// Whether a block with the given hash is stored.
    fn block_exists(&self, hash: &Hash) -> Result<bool, ChainError>;
    /// Remove a block by hash.
    fn delete(&self, hash: &Hash) -> Result<(), ChainError>;
    /// Blocks with indices in `[start, end)`, in index order.
    fn get_range(&self, start: u64, end: u64) -> Result<Vec<Block>, ChainError>;
}

#[derive(Default)]
struct Store {
    by_index: BTreeMap<u64, Block>,
    hash_to_index: std::collections::HashMap<Hash, u64>,
}

/// A `RwLock`-guarded in-memory [`ChainRepository`], used as the default
/// and by tests.
#[derive(Default)]
pub struct InMemoryChainRepository {
    store: RwLock<Store>,
}

impl InMemoryChainRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainRepository for InMemoryChainRepository {
    fn save(&self, block: &Block) -> Result<(), ChainError> {
        let hash = crate::canonical::canonical_hash(block);
        let mut store = self
            .store
            .write()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        store.by_index.insert(block.header.index, block.clone());
        store.hash_to_index.insert(hash, block.header.index);
        Ok(())
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Option<Block>, ChainError> {
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store
            .hash_to_index
            .get(hash)
            .and_then(|index| store.by_index.get(index))
            .cloned())
    }

    fn get_by_index(&self, index: u64) -> Result<Option<Block>, ChainError> {
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store.by_index.get(&index).cloned())
    }

    fn get_latest(&self) -> Result<Option<Block>, ChainError> {
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store.by_index.values().next_back().cloned())
    }

    fn get_height(&self) -> Result<u64, ChainError> {
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store.by_index.keys().next_back().map_or(0, |i| i + 1))
    }

    fn block_exists(&self, hash: &Hash) -> Result<bool, ChainError> {
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store.hash_to_index.contains_key(hash))
    }

    fn delete(&self, hash: &Hash) -> Result<(), ChainError> {
        let mut store = self
            .store
            .write()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        if let Some(index) = store.hash_to_index.remove(hash) {
            store.by_index.remove(&index);
        }
        Ok(())
    }

    fn get_range(&self, start: u64, end: u64) -> Result<Vec<Block>, ChainError> {
        if end < start {
            return Err(ChainError::InvalidArgument(format!(
                "range end {end} is before start {start}"
            )));
        }
        let store = self
            .store
            .read()
            .map_err(|_| ChainError::Repository("lock poisoned".to_string()))?;
        Ok(store
            .by_index
            .range(start..end)
            .map(|(_, block)| block.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voting_types::{BlockHeader, NodeId, Signature, Timestamp, Transaction, TransactionType};

    fn sample_block(index: u64, previous_hash: Hash) -> Block {
        let mut tx = Transaction::new(
            TransactionType::Vote,
            NodeId::from_bytes(&[1u8; 16]),
            NodeId::EMPTY,
            b"x".to_vec(),
            Timestamp::new(1, 0),
        );
        tx.seal();
        Block {
            header: BlockHeader {
                index,
                previous_hash,
                timestamp: Timestamp::new(1, 0),
                merkle_root: Hash::from_bytes(&tx.canonical_bytes()),
                nonce: 0,
                validator: NodeId::from_bytes(&[2u8; 16]),
                signature: Signature::empty(),
            },
            transactions: vec![tx],
        }
    }

    #[test]
    fn save_and_fetch_by_both_keys() {
        let repo = InMemoryChainRepository::new();
        let block = sample_block(0, Hash::EMPTY);
        let hash = crate::canonical::canonical_hash(&block);
        repo.save(&block).unwrap();

        assert_eq!(repo.get_by_index(0).unwrap(), Some(block.clone()));
        assert_eq!(repo.get_by_hash(&hash).unwrap(), Some(block.clone()));
        assert!(repo.block_exists(&hash).unwrap());
        assert_eq!(repo.get_height().unwrap(), 1);
        assert_eq!(repo.get_latest().unwrap(), Some(block));
    }

    #[test]
    fn delete_removes_from_both_indices() {
        let repo = InMemoryChainRepository::new();
        let block = sample_block(0, Hash::EMPTY);
        let hash = crate::canonical::canonical_hash(&block);
        repo.save(&block).unwrap();
        repo.delete(&hash).unwrap();
        assert_eq!(repo.get_by_hash(&hash).unwrap(), None);
        assert_eq!(repo.get_height().unwrap(), 0);
    }

    #[test]
    fn get_range_is_half_open() {
        let repo = InMemoryChainRepository::new();
        for i in 0..5 {
            let previous = if i == 0 {
                Hash::EMPTY
            } else {
                crate::canonical::canonical_hash(&repo.get_by_index(i - 1).unwrap().unwrap())
            };
            repo.save(&sample_block(i, previous)).unwrap();
        }
        let range = repo.get_range(1, 4).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range[0].header.index, 1);
        assert_eq!(range[2].header.index, 3);
    }
}
