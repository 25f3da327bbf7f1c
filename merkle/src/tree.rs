//! Merkle tree construction and proofs.
//!
//! Convention (fixed so that proofs generated later for the same leaf set
//! are stable):
//! - leaves are hashed in caller-given order: `leaf_hash = keccak256(leaf)`;
//! - an interior node hashes the lexicographically smaller child first
//!   (sorted-pair), so verifiers need no left/right flags;
//! - an odd node at the end of a layer is promoted unchanged.

use sha3::{Digest, Keccak256};

use agora_types::ContentHash;

fn keccak256(bytes: &[u8]) -> ContentHash {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(out.as_slice());
    ContentHash::new(digest)
}

fn hash_pair(a: &ContentHash, b: &ContentHash) -> ContentHash {
    let (lo, hi) = if a.as_bytes() <= b.as_bytes() {
        (a, b)
    } else {
        (b, a)
    };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_bytes());
    buf[32..].copy_from_slice(hi.as_bytes());
    keccak256(&buf)
}

/// A fully materialized Merkle tree.
///
/// `layers[0]` holds the hashed leaves; the last layer holds the root.
pub struct MerkleTree {
    layers: Vec<Vec<ContentHash>>,
}

impl MerkleTree {
    /// Build a tree over the given leaves, in order.
    ///
    /// The empty tree has the zero root.
    pub fn build(leaves: &[ContentHash]) -> Self {
        if leaves.is_empty() {
            return Self { layers: Vec::new() };
        }

        let mut layers: Vec<Vec<ContentHash>> = Vec::new();
        layers.push(leaves.iter().map(|l| keccak256(l.as_bytes())).collect());

        while layers.last().expect("non-empty").len() > 1 {
            let current = layers.last().expect("non-empty");
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                match pair {
                    [a, b] => next.push(hash_pair(a, b)),
                    [a] => next.push(*a),
                    _ => unreachable!("chunks(2) yields 1 or 2 elements"),
                }
            }
            layers.push(next);
        }

        Self { layers }
    }

    pub fn root(&self) -> ContentHash {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(ContentHash::ZERO)
    }

    /// Inclusion proof for a leaf value (not a leaf hash).
    ///
    /// Returns the sibling hashes bottom-up, or `None` if the leaf is not
    /// in the tree.
    pub fn proof(&self, leaf: &ContentHash) -> Option<Vec<ContentHash>> {
        let target = keccak256(leaf.as_bytes());
        let mut index = self.layers.first()?.iter().position(|h| *h == target)?;

        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            if let Some(hash) = layer.get(sibling) {
                proof.push(*hash);
            }
            index /= 2;
        }
        Some(proof)
    }

    /// Verify an inclusion proof against a root.
    pub fn verify(root: &ContentHash, leaf: &ContentHash, proof: &[ContentHash]) -> bool {
        let mut acc = keccak256(leaf.as_bytes());
        for sibling in proof {
            acc = hash_pair(&acc, sibling);
        }
        acc == *root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u8) -> ContentHash {
        ContentHash::new([n; 32])
    }

    #[test]
    fn empty_tree_has_zero_root() {
        let tree = MerkleTree::build(&[]);
        assert_eq!(tree.root(), ContentHash::ZERO);
        assert!(tree.proof(&leaf(1)).is_none());
    }

    #[test]
    fn single_leaf_root_is_its_hash() {
        let tree = MerkleTree::build(&[leaf(1)]);
        assert_eq!(tree.root(), keccak256(leaf(1).as_bytes()));
        let proof = tree.proof(&leaf(1)).unwrap();
        assert!(proof.is_empty());
        assert!(MerkleTree::verify(&tree.root(), &leaf(1), &proof));
    }

    #[test]
    fn proofs_verify_for_every_leaf() {
        for n in 1..=9usize {
            let leaves: Vec<ContentHash> = (0..n as u8).map(leaf).collect();
            let tree = MerkleTree::build(&leaves);
            for l in &leaves {
                let proof = tree.proof(l).unwrap();
                assert!(
                    MerkleTree::verify(&tree.root(), l, &proof),
                    "proof failed for leaf in {n}-leaf tree"
                );
            }
        }
    }

    #[test]
    fn proof_for_absent_leaf_is_none() {
        let tree = MerkleTree::build(&[leaf(1), leaf(2)]);
        assert!(tree.proof(&leaf(3)).is_none());
    }

    #[test]
    fn wrong_proof_does_not_verify() {
        let tree = MerkleTree::build(&[leaf(1), leaf(2), leaf(3)]);
        let mut proof = tree.proof(&leaf(1)).unwrap();
        proof[0] = leaf(0xFF);
        assert!(!MerkleTree::verify(&tree.root(), &leaf(1), &proof));
    }

    #[test]
    fn rebuilding_the_same_leaves_is_stable() {
        let leaves: Vec<ContentHash> = (0..7).map(leaf).collect();
        let a = MerkleTree::build(&leaves);
        let b = MerkleTree::build(&leaves);
        assert_eq!(a.root(), b.root());
        assert_eq!(a.proof(&leaf(3)), b.proof(&leaf(3)));
    }

    #[test]
    fn leaf_order_changes_the_root() {
        // Sorted-pair hashing makes swaps within one pair commute; an order
        // change that regroups pairs must change the root.
        let forward: Vec<ContentHash> = (0..4).map(leaf).collect();
        let rotated: Vec<ContentHash> = (0..4).map(|n| leaf((n + 1) % 4)).collect();
        assert_ne!(
            MerkleTree::build(&forward).root(),
            MerkleTree::build(&rotated).root()
        );
    }
}
