//! Position map: logical block id to currently assigned leaf.
//!
//! Every real block (plus one dummy id) is mapped to a uniformly random leaf
//! at initialization and remapped to a fresh leaf on every access. The map
//! is the single source of truth for where a block's path ends; eviction
//! placement always consults it after the remap has been committed.

use rand::Rng;

use crate::core::tree::Geometry;

/// Per-block leaf assignments.
#[derive(Debug, Clone)]
pub struct PositionMap {
    leaves: Vec<usize>,
    first_leaf: usize,
    last_leaf: usize,
}

impl PositionMap {
    /// Creates a map covering `real_block_count + 1` ids (the extra entry is
    /// the dummy id), each assigned a uniformly random leaf.
    pub fn new(geom: &Geometry, rng: &mut impl Rng) -> Self {
        let first_leaf = geom.first_leaf();
        let last_leaf = geom.last_leaf();
        let leaves = (0..=geom.real_block_count)
            .map(|_| rng.gen_range(first_leaf..=last_leaf))
            .collect();
        Self {
            leaves,
            first_leaf,
            last_leaf,
        }
    }

    /// Leaf currently assigned to `id`.
    pub fn leaf_of(&self, id: usize) -> usize {
        self.leaves[id]
    }

    /// Commits a new leaf for `id`.
    pub fn remap(&mut self, id: usize, leaf: usize) {
        debug_assert!((self.first_leaf..=self.last_leaf).contains(&leaf));
        self.leaves[id] = leaf;
    }

    /// Samples a uniformly random leaf distinct from `id`'s current one.
    ///
    /// Reject-and-resample; with at least two leaves this terminates with
    /// probability 1 and in O(1) expected draws.
    pub fn sample_fresh_leaf(&self, id: usize, rng: &mut impl Rng) -> usize {
        let current = self.leaves[id];
        loop {
            let leaf = rng.gen_range(self.first_leaf..=self.last_leaf);
            if leaf != current {
                return leaf;
            }
        }
    }

    /// Number of mapped ids (including the dummy id).
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the map is empty (never true for a configured engine).
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
