//! significance::blocks — exchangeability trees for restricted permutations.
//!
//! Purpose
//! -------
//! Turn an `n×k` array of block labels into a tree that draws only those
//! permutations the labels allow. Without labels every permutation of the
//! `n` samples is allowed.
//!
//! Key behaviors
//! -------------
//! - Column `c` splits each block from column `c−1` by label; leaves are
//!   samples. Labels are visited in ascending order.
//! - At every node, children with non-negative labels may trade places
//!   with siblings of the same size; negative-labelled children keep
//!   their position. Leaves are always exchangeable within their block.
//! - Each level is permuted independently, so a fixed block still has its
//!   interior shuffled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every draw is a permutation of `0..n`: `perm[i]` is the sample whose
//!   `y` row is moved into position `i`.
//! - Draws are a pure function of the RNG state.
use ndarray::ArrayView2;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum PermNode {
    Leaf(usize),
    Block { label: i64, size: usize, children: Vec<PermNode> },
}

impl PermNode {
    fn size(&self) -> usize {
        match self {
            PermNode::Leaf(_) => 1,
            PermNode::Block { size, .. } => *size,
        }
    }

    fn exchangeable(&self) -> bool {
        match self {
            PermNode::Leaf(_) => true,
            PermNode::Block { label, .. } => *label >= 0,
        }
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            PermNode::Leaf(i) => out.push(*i),
            PermNode::Block { children, .. } => {
                children.iter().for_each(|child| child.collect_leaves(out))
            }
        }
    }

    fn permuted<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let children = match self {
            PermNode::Leaf(i) => return vec![*i],
            PermNode::Block { children, .. } => children,
        };
        let parts: Vec<Vec<usize>> = children.iter().map(|child| child.permuted(rng)).collect();

        let mut by_size: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (k, child) in children.iter().enumerate() {
            if child.exchangeable() {
                by_size.entry(child.size()).or_default().push(k);
            }
        }
        let mut source: Vec<usize> = (0..children.len()).collect();
        for slots in by_size.values() {
            let mut drawn = slots.clone();
            drawn.shuffle(rng);
            for (&slot, &from) in slots.iter().zip(&drawn) {
                source[slot] = from;
            }
        }
        source.iter().flat_map(|&from| parts[from].iter().copied()).collect()
    }
}

fn build_level(blocks: ArrayView2<'_, i64>, rows: &[usize], col: usize) -> Vec<PermNode> {
    if col == blocks.ncols() {
        return rows.iter().map(|&r| PermNode::Leaf(r)).collect();
    }
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for &r in rows {
        groups.entry(blocks[[r, col]]).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(label, members)| PermNode::Block {
            label,
            size: members.len(),
            children: build_level(blocks, &members, col + 1),
        })
        .collect()
}

/// Exchangeability tree over `n` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PermTree {
    root: PermNode,
    /// Leaf order of the unpermuted tree.
    positions: Vec<usize>,
}

impl PermTree {
    /// Tree allowing every permutation of `n` samples.
    pub fn unrestricted(n: usize) -> Self {
        let children = (0..n).map(PermNode::Leaf).collect();
        Self::from_root(PermNode::Block { label: 0, size: n, children })
    }

    /// Tree built from block labels; one row per sample, one column per
    /// nesting level. A zero-column array is unrestricted.
    ///
    /// Row count is checked by
    /// [`crate::independence::validation::check_perm_blocks_dim`].
    pub fn from_blocks(blocks: ArrayView2<'_, i64>) -> Self {
        let n = blocks.nrows();
        let rows: Vec<usize> = (0..n).collect();
        let children = build_level(blocks, &rows, 0);
        Self::from_root(PermNode::Block { label: 0, size: n, children })
    }

    fn from_root(root: PermNode) -> Self {
        let mut positions = Vec::with_capacity(root.size());
        root.collect_leaves(&mut positions);
        Self { root, positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Draw one admissible permutation.
    pub fn permutation<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let drawn = self.root.permuted(rng);
        let mut perm = vec![0_usize; drawn.len()];
        for (&pos, &from) in self.positions.iter().zip(&drawn) {
            perm[pos] = from;
        }
        perm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Draws are permutations of 0..n.
    // - Negative labels pin blocks; samples never leave a pinned block.
    // - Equal-size positive blocks can swap wholesale.
    // -------------------------------------------------------------------------

    fn is_permutation(perm: &[usize]) -> bool {
        let mut sorted = perm.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &v)| i == v)
    }

    #[test]
    fn unrestricted_draws_are_permutations() {
        let tree = PermTree::unrestricted(20);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            assert!(is_permutation(&tree.permutation(&mut rng)));
        }
    }

    #[test]
    // Purpose
    // -------
    // Samples in a negative-labelled block are only shuffled among
    // themselves.
    //
    // Given
    // -----
    // - Two fixed blocks of three samples (labels −1 and −2).
    //
    // Expect
    // ------
    // - perm[i] lies in the same block as i for every draw.
    fn negative_labels_keep_samples_inside_their_block() {
        // Arrange
        let blocks = array![[-1_i64], [-1], [-1], [-2], [-2], [-2]];
        let tree = PermTree::from_blocks(blocks.view());
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            // Act
            let perm = tree.permutation(&mut rng);

            // Assert
            assert!(is_permutation(&perm));
            for (i, &from) in perm.iter().enumerate() {
                assert_eq!(blocks[[i, 0]], blocks[[from, 0]], "perm = {perm:?}");
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Equal-size exchangeable blocks swap as units: in a two-level layout
    // with a single leaf per inner block, positions 0 and 1 always hold
    // samples of one outer block.
    fn equal_size_blocks_swap_wholesale() {
        let blocks = array![[0_i64, 0], [0, 1], [1, 0], [1, 1]];
        let tree = PermTree::from_blocks(blocks.view());
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let mut swapped = false;
        for _ in 0..100 {
            let perm = tree.permutation(&mut rng);
            assert!(is_permutation(&perm));
            assert_eq!(blocks[[perm[0], 0]], blocks[[perm[1], 0]], "perm = {perm:?}");
            swapped |= blocks[[perm[0], 0]] == 1;
        }
        assert!(swapped, "outer blocks never exchanged");
    }

    #[test]
    fn mixed_sizes_do_not_exchange() {
        let blocks = array![[0_i64], [0], [1], [1], [1]];
        let tree = PermTree::from_blocks(blocks.view());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let perm = tree.permutation(&mut rng);
            assert!(perm[..2].iter().all(|&p| p < 2), "perm = {perm:?}");
        }
    }

    #[test]
    fn zero_column_blocks_are_unrestricted() {
        let blocks = Array2::<i64>::zeros((5, 0));
        let tree = PermTree::from_blocks(blocks.view());
        assert_eq!(tree, PermTree::unrestricted(5));
        assert_eq!(tree.len(), 5);
    }
}
