use crate::claim::Claim;
use crate::common::Hash256;
use crate::error::{OfferError, Result};

/// Merkle tree over the claims of one batch.
///
/// Leaves are the raw claims in row order; they are neither sorted nor
/// deduplicated. Each internal node hashes its two children in ascending
/// byte order, so a proof verifies without knowing the leaf position. An
/// unpaired node at the end of a level moves up unchanged.
#[derive(Debug, Clone)]
pub struct BatchTree {
    levels: Vec<Vec<[u8; 32]>>,
    root: [u8; 32],
}

/// Hashes two sibling nodes in ascending byte order.
pub fn hash_sorted<H: Hash256 + ?Sized>(hasher: &H, a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        hasher.hash_pair(a, b)
    } else {
        hasher.hash_pair(b, a)
    }
}

impl BatchTree {
    /// Builds the tree for `claims`.
    ///
    /// # Errors
    /// Returns `EmptyBatch` if there are no claims
    pub fn build<H: Hash256 + ?Sized>(hasher: &H, claims: &[Claim]) -> Result<Self> {
        if claims.is_empty() {
            return Err(OfferError::EmptyBatch);
        }

        let mut levels: Vec<Vec<[u8; 32]>> = vec![claims.iter().map(|c| c.0).collect()];
        let mut level = levels[0].clone();

        while level.len() > 1 {
            let next_level: Vec<[u8; 32]> = level
                .chunks(2)
                .map(|chunk| match chunk {
                    [left, right] => hash_sorted(hasher, left, right),
                    _ => chunk[0],
                })
                .collect();

            levels.push(next_level.clone());
            level = next_level;
        }

        let root = level[0];
        Ok(Self { levels, root })
    }

    pub fn root(&self) -> [u8; 32] {
        self.root
    }

    /// Number of leaves. Never zero.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Sibling hashes from leaf `index` up to the root.
    ///
    /// # Errors
    /// Returns `IndexOutOfRange` if `index` is not a leaf position
    pub fn proof(&self, index: usize) -> Result<Vec<[u8; 32]>> {
        if index >= self.leaf_count() {
            return Err(OfferError::IndexOutOfRange {
                index,
                leaves: self.leaf_count(),
            });
        }

        let mut proof = Vec::new();
        let mut current_index = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_index = current_index ^ 1;
            if let Some(sibling) = level.get(sibling_index) {
                proof.push(*sibling);
            }
            current_index /= 2;
        }

        Ok(proof)
    }
}

/// Recomputes the root from `leaf` and `proof` and compares it to `root`.
pub fn verify_proof<H: Hash256 + ?Sized>(
    hasher: &H,
    leaf: &[u8; 32],
    proof: &[[u8; 32]],
    root: &[u8; 32],
) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_sorted(hasher, &node, sibling));
    computed == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Keccak;

    fn claims(n: u8) -> Vec<Claim> {
        (0..n).map(|i| Claim([i.wrapping_mul(37).wrapping_add(1); 32])).collect()
    }

    /// Byte-wise sum, good enough to check tree shape without Keccak.
    struct SumHasher;

    impl Hash256 for SumHasher {
        fn hash(&self, data: &[u8]) -> [u8; 32] {
            let mut out = [0u8; 32];
            for (i, b) in data.iter().enumerate() {
                out[i % 32] = out[i % 32].wrapping_add(*b);
            }
            out
        }
    }

    #[test]
    fn test_empty_batch() {
        let err = BatchTree::build(&Keccak, &[]).unwrap_err();
        assert!(matches!(err, OfferError::EmptyBatch));
    }

    #[test]
    fn test_single_leaf() {
        let leaves = claims(1);
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        assert_eq!(tree.root(), leaves[0].0);
        assert!(tree.proof(0).unwrap().is_empty());
        assert!(verify_proof(&Keccak, &leaves[0].0, &[], &tree.root()));
    }

    #[test]
    fn test_two_leaves() {
        let leaves = claims(2);
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        assert_eq!(
            tree.root(),
            hash_sorted(&Keccak, &leaves[0].0, &leaves[1].0)
        );
        assert_eq!(tree.proof(0).unwrap(), vec![leaves[1].0]);
        assert_eq!(tree.proof(1).unwrap(), vec![leaves[0].0]);
    }

    #[test]
    fn test_odd_leaf_is_promoted() {
        let leaves = claims(3);
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        let left = hash_sorted(&Keccak, &leaves[0].0, &leaves[1].0);
        assert_eq!(tree.root(), hash_sorted(&Keccak, &left, &leaves[2].0));
        assert_eq!(tree.proof(2).unwrap(), vec![left]);
        assert_eq!(tree.proof(0).unwrap(), vec![leaves[1].0, leaves[2].0]);
    }

    #[test]
    fn test_every_proof_verifies() {
        for n in 1..=17u8 {
            let leaves = claims(n);
            let tree = BatchTree::build(&Keccak, &leaves).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(
                    verify_proof(&Keccak, &leaf.0, &proof, &tree.root()),
                    "leaf {i} of {n}"
                );
            }
        }
    }

    #[test]
    fn test_proof_rejects_foreign_leaf() {
        let leaves = claims(4);
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        let proof = tree.proof(0).unwrap();
        assert!(!verify_proof(&Keccak, &[0xee; 32], &proof, &tree.root()));
    }

    #[test]
    fn test_proofs_not_reusable_across_batches() {
        let leaves = claims(4);
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        let mut changed = leaves.clone();
        changed[3] = Claim([0xaa; 32]);
        let other = BatchTree::build(&Keccak, &changed).unwrap();
        assert_ne!(tree.root(), other.root());
        assert!(!verify_proof(&Keccak, &leaves[0].0, &tree.proof(0).unwrap(), &other.root()));
    }

    #[test]
    fn test_duplicate_leaves_kept() {
        let leaves = vec![Claim([5u8; 32]); 3];
        let tree = BatchTree::build(&Keccak, &leaves).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        for i in 0..3 {
            assert!(verify_proof(&Keccak, &leaves[i].0, &tree.proof(i).unwrap(), &tree.root()));
        }
    }

    #[test]
    fn test_reordered_leaves_stay_provable() {
        let leaves = claims(5);
        let mut reversed = leaves.clone();
        reversed.reverse();
        let tree = BatchTree::build(&Keccak, &reversed).unwrap();
        for leaf in &leaves {
            let index = reversed.iter().position(|c| c == leaf).unwrap();
            assert!(verify_proof(&Keccak, &leaf.0, &tree.proof(index).unwrap(), &tree.root()));
        }
    }

    #[test]
    fn test_proof_out_of_bounds() {
        let tree = BatchTree::build(&Keccak, &claims(2)).unwrap();
        assert!(matches!(
            tree.proof(5),
            Err(OfferError::IndexOutOfRange { index: 5, leaves: 2 })
        ));
    }

    #[test]
    fn test_injected_hasher() {
        let leaves = vec![Claim([1u8; 32]), Claim([2u8; 32])];
        let tree = BatchTree::build(&SumHasher, &leaves).unwrap();
        assert_eq!(tree.root(), [3u8; 32]);
        assert!(verify_proof(&SumHasher, &leaves[1].0, &tree.proof(1).unwrap(), &tree.root()));
    }
}
