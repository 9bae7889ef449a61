//! Merkle tree over ordered leaf byte-strings.
//!
//! Each leaf hash is `SHA-256(leaf_bytes)`. Internal nodes hash the
//! concatenation of their children. Levels with an odd node count
//! duplicate the last node to form the next level's parent, rather than
//! padding with a zero hash.

use crate::Hash;

/// Errors building or verifying a Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleError {
    /// Attempted to build a tree over zero leaves.
    #[error("cannot build a Merkle tree with no leaves")]
    EmptyLeaves,
}

/// An inclusion proof for one leaf in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Hash of the leaf this proof is for.
    pub leaf_hash: Hash,
    /// Index of the leaf among the original (unpadded) leaves.
    pub leaf_index: usize,
    /// Sibling hashes, ordered from the leaf's level up to the root.
    pub siblings: Vec<Hash>,
    /// For each sibling, whether it sits to the right of the current node.
    pub directions: Vec<bool>,
}

impl MerkleProof {
    /// Recompute the root from `leaf_hash` and this proof's siblings, and
    /// compare against `root`.
    pub fn verify(&self, root: &Hash) -> bool {
        let mut current = self.leaf_hash;
        for (sibling, sibling_on_right) in self.siblings.iter().zip(self.directions.iter()) {
            current = if *sibling_on_right {
                hash_pair(&current, sibling)
            } else {
                hash_pair(sibling, &current)
            };
        }
        current == *root
    }
}

#[inline]
fn leaf_hash(data: &[u8]) -> Hash {
    Hash::from_bytes(data)
}

#[inline]
fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_bytes());
    buf[32..].copy_from_slice(right.as_bytes());
    Hash::from_bytes(&buf)
}

/// A built Merkle tree, retaining every level for proof generation.
pub struct MerkleTree {
    /// `levels[0]` is the leaf level, `levels.last()` is `[root]`.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from ordered leaf byte-strings.
    pub fn build(leaves: &[Vec<u8>]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }
        let mut levels = vec![leaves.iter().map(|l| leaf_hash(l)).collect::<Vec<_>>()];
        while levels.last().unwrap().len() > 1 {
            let current = levels.last().unwrap();
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            let mut i = 0;
            while i < current.len() {
                let left = &current[i];
                let right = if i + 1 < current.len() {
                    &current[i + 1]
                } else {
                    left
                };
                next.push(hash_pair(left, right));
                i += 2;
            }
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// The Merkle root.
    pub fn root(&self) -> Hash {
        self.levels.last().unwrap()[0]
    }

    /// Number of original leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Generate an inclusion proof for the leaf at `index`.
    pub fn prove(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }
        let leaf_hash = self.levels[0][index];
        let mut siblings = Vec::new();
        let mut directions = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 {
                // current is the left child; sibling is on the right,
                // duplicated from `idx` itself if it has no right neighbour.
                (idx + 1).min(level.len() - 1)
            } else {
                idx - 1
            };
            siblings.push(level[sibling_idx]);
            directions.push(idx % 2 == 0);
            idx /= 2;
        }
        Some(MerkleProof {
            leaf_hash,
            leaf_index: index,
            siblings,
            directions,
        })
    }
}

/// Convenience: build a tree and return just the root.
pub fn merkle_root(leaves: &[Vec<u8>]) -> Result<Hash, MerkleError> {
    MerkleTree::build(leaves).map(|t| t.root())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_leaves_error() {
        assert_eq!(MerkleTree::build(&[]).unwrap_err(), MerkleError::EmptyLeaves);
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let leaf = b"only leaf".to_vec();
        let tree = MerkleTree::build(&[leaf.clone()]).unwrap();
        assert_eq!(tree.root(), leaf_hash(&leaf));
        let proof = tree.prove(0).unwrap();
        assert!(proof.verify(&tree.root()));
        assert!(proof.siblings.is_empty());
    }

    #[test]
    fn two_leaves() {
        let leaves = vec![b"a".to_vec(), b"b".to_vec()];
        let tree = MerkleTree::build(&leaves).unwrap();
        let expected = hash_pair(&leaf_hash(&leaves[0]), &leaf_hash(&leaves[1]));
        assert_eq!(tree.root(), expected);
        for i in 0..2 {
            assert!(tree.prove(i).unwrap().verify(&tree.root()));
        }
    }

    #[test]
    fn odd_count_duplicates_last() {
        let leaves: Vec<Vec<u8>> = (0..5u8).map(|b| vec![b]).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        for i in 0..leaves.len() {
            assert!(tree.prove(i).unwrap().verify(&tree.root()), "leaf {i}");
        }
    }

    #[test]
    fn large_tree() {
        let leaves: Vec<Vec<u8>> = (0u32..1000).map(|i| i.to_le_bytes().to_vec()).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        for i in [0, 1, 499, 500, 999] {
            assert!(tree.prove(i).unwrap().verify(&tree.root()));
        }
    }

    #[test]
    fn proof_rejects_wrong_root() {
        let leaves: Vec<Vec<u8>> = (0..4u8).map(|b| vec![b]).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let proof = tree.prove(0).unwrap();
        assert!(!proof.verify(&Hash::from_bytes(b"wrong root")));
    }

    #[test]
    fn proof_rejects_tampered_sibling() {
        let leaves: Vec<Vec<u8>> = (0..4u8).map(|b| vec![b]).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let mut proof = tree.prove(1).unwrap();
        proof.siblings[0] = Hash::from_bytes(b"tampered");
        assert!(!proof.verify(&tree.root()));
    }

    #[test]
    fn proof_rejects_flipped_direction() {
        let leaves: Vec<Vec<u8>> = (0..4u8).map(|b| vec![b]).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let mut proof = tree.prove(1).unwrap();
        proof.directions[0] = !proof.directions[0];
        assert!(!proof.verify(&tree.root()));
    }
}
