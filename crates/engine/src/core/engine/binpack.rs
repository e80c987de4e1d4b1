//! Quantity map and best-fit path search for batch eviction.
//!
//! The staged engine amortizes eviction cost by writing a whole frequency
//! group of candidate blocks to one well-chosen path. Choosing that path
//! needs per-leaf free-slot counts over full root-to-leaf paths: the
//! quantity map. The map is transient, derived data, rebuilt from the tree
//! immediately before every selection and discarded afterwards.

use crate::core::tree::{Geometry, TreeSlots};

/// Per-leaf free-slot counts along full root-to-leaf paths.
#[derive(Debug, Clone)]
pub struct QuantityMap {
    free: Vec<usize>,
}

/// Result of a best-fit path selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFit {
    /// Ordinal of the chosen leaf within `0..leaf_count`.
    pub leaf_ordinal: usize,
    /// Whether the path's free space covers the need (exact or larger).
    /// An under-allocation forces a retry with the remainder.
    pub adequate: bool,
}

impl QuantityMap {
    /// Rebuilds the map from the current tree contents.
    ///
    /// Walks the implicit tree from the root, accumulating the empty-slot
    /// count of every bucket down both subtrees; at each leaf the
    /// accumulated prefix is that leaf's full-path free count.
    pub fn rebuild(geom: &Geometry, slots: &TreeSlots) -> Self {
        let mut free = vec![0; geom.leaf_count];
        Self::walk(geom, slots, &mut free, 0, 0);
        Self { free }
    }

    fn walk(
        geom: &Geometry,
        slots: &TreeSlots,
        free: &mut [usize],
        bucket: usize,
        from_root: usize,
    ) {
        let from_root = from_root + slots.empty_in_bucket(bucket);
        if geom.is_leaf(bucket) {
            free[geom.leaf_ordinal(bucket)] = from_root;
        } else {
            Self::walk(geom, slots, free, 2 * bucket + 1, from_root);
            Self::walk(geom, slots, free, 2 * bucket + 2, from_root);
        }
    }

    /// Free-slot count for the path to the leaf with `ordinal`.
    pub fn free_on_path(&self, ordinal: usize) -> usize {
        self.free[ordinal]
    }

    /// Selects the path best fitting `needed` free slots.
    ///
    /// Preference order: a path whose free count equals `needed` exactly;
    /// else the path with the smallest free count strictly above `needed`;
    /// else the path with the largest free count below `needed` (an
    /// under-allocation, retried with the remainder).
    pub fn best_fit(&self, needed: usize) -> PathFit {
        let mut large_ordinal = 0;
        let mut large_gap = usize::MAX;
        let mut small_ordinal = 0;
        let mut small_gap = usize::MAX;
        let mut has_large = false;

        for (ordinal, &free) in self.free.iter().enumerate() {
            if free == needed {
                return PathFit {
                    leaf_ordinal: ordinal,
                    adequate: true,
                };
            }
            if free > needed {
                has_large = true;
                if free - needed < large_gap {
                    large_ordinal = ordinal;
                    large_gap = free - needed;
                }
            } else if !has_large && needed - free < small_gap {
                small_ordinal = ordinal;
                small_gap = needed - free;
            }
        }

        if has_large {
            PathFit {
                leaf_ordinal: large_ordinal,
                adequate: true,
            }
        } else {
            PathFit {
                leaf_ordinal: small_ordinal,
                adequate: false,
            }
        }
    }

    /// Total free slots across all paths (used by diagnostics and tests).
    pub fn total_free(&self) -> usize {
        self.free.iter().sum()
    }
}

/// Convenience: rebuild the map and select a best-fit path in one step.
pub(crate) fn find_best_fit_path(geom: &Geometry, slots: &TreeSlots, needed: usize) -> PathFit {
    QuantityMap::rebuild(geom, slots).best_fit(needed)
}
