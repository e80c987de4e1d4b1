//! Baseline ordered stash.
//!
//! Blocks pulled off a path wait here until an eviction pass places them
//! back into the tree. Lookup is a linear scan; the structure is small by
//! construction (bounded by the configured capacity), and the scan order
//! mirrors insertion order so eviction considers older blocks first.

use super::OccupancyModel;

/// Ordered collection of off-tree block ids awaiting eviction.
#[derive(Debug, Clone)]
pub struct Stash {
    entries: Vec<usize>,
    occupancy: OccupancyModel,
}

impl Stash {
    /// Creates an empty stash.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Configured capacity in blocks.
    /// * `path_slots` - Slots on one full path (`Z * level_count`).
    /// * `fill_threshold` - Occupancy fraction that triggers proactive
    ///   eviction.
    pub fn new(capacity: usize, path_slots: usize, fill_threshold: f64) -> Self {
        Self {
            entries: Vec::new(),
            occupancy: OccupancyModel::new(capacity, path_slots, fill_threshold),
        }
    }

    /// Whether `id` is currently stashed.
    pub fn contains(&self, id: usize) -> bool {
        self.entries.contains(&id)
    }

    /// Appends `id` to the stash.
    pub fn push(&mut self, id: usize) {
        self.entries.push(id);
    }

    /// Number of stashed blocks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stash holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether fewer than `margin` blocks of usable headroom remain.
    pub fn is_full(&self, margin: usize) -> bool {
        self.occupancy.is_full(self.entries.len(), margin)
    }

    /// Whether occupancy has crossed the proactive-eviction threshold.
    pub fn is_almost_full(&self) -> bool {
        self.occupancy.is_almost_full(self.entries.len())
    }

    /// Keeps only the entries for which `keep` returns `true`, preserving
    /// order. Eviction passes use this to drain placed blocks.
    pub fn retain(&mut self, keep: impl FnMut(&usize) -> bool) {
        self.entries.retain(keep);
    }

    /// Samples the current occupancy into the peak/last metrics.
    pub fn record_occupancy(&mut self) {
        self.occupancy.record(self.entries.len());
    }

    /// Occupancy bookkeeping (peak/last/capacity).
    pub fn occupancy(&self) -> &OccupancyModel {
        &self.occupancy
    }

    /// Stashed ids in insertion order.
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }
}
