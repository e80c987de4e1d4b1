//! Temporal/candidate staging area for the staged engine.
//!
//! The staging area splits off-tree blocks into two populations:
//! 1. **Temporal:** Blocks swept off a path as a side effect of a read and
//!    not themselves requested. They are placement fodder for the next
//!    path write.
//! 2. **Candidate:** Blocks that were actually requested (or written back
//!    from an outer layer), tracked with an access-frequency counter in
//!    [`FrequencyBuckets`]. Candidates leave only through the bin-packed
//!    batch kick-out.
//!
//! A block never appears in both areas: a temporal block that gets
//! requested is promoted into the candidate structure.

use super::{FrequencyBuckets, OccupancyModel};
use std::collections::HashSet;

/// Two-part staging structure of the staged engine.
#[derive(Debug, Clone)]
pub struct StagingArea {
    temporal: HashSet<usize>,
    candidate: FrequencyBuckets,
    occupancy: OccupancyModel,
    path_slots: usize,
}

impl StagingArea {
    /// Creates an empty staging area.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Configured capacity in blocks (both areas combined).
    /// * `path_slots` - Slots on one full path (`Z * level_count`).
    /// * `fill_threshold` - Occupancy fraction that triggers eviction.
    pub fn new(capacity: usize, path_slots: usize, fill_threshold: f64) -> Self {
        Self {
            temporal: HashSet::new(),
            candidate: FrequencyBuckets::new(),
            occupancy: OccupancyModel::new(capacity, path_slots, fill_threshold),
            path_slots,
        }
    }

    /// Inserts a swept-off block into the temporal area.
    pub fn put_temporal(&mut self, id: usize) {
        let _ = self.temporal.insert(id);
    }

    /// Whether `id` sits in the temporal area.
    pub fn temporal_contains(&self, id: usize) -> bool {
        self.temporal.contains(&id)
    }

    /// Removes `id` from the temporal area.
    pub fn remove_temporal(&mut self, id: usize) {
        let _ = self.temporal.remove(&id);
    }

    /// Records a touch of `id` in the candidate area (inserting at
    /// frequency 1 if new) and returns its new frequency.
    pub fn promote(&mut self, id: usize) -> u64 {
        debug_assert!(
            !self.temporal.contains(&id),
            "promotion must remove the temporal entry first"
        );
        self.candidate.touch(id)
    }

    /// Whether `id` sits in the candidate area.
    pub fn candidate_contains(&self, id: usize) -> bool {
        self.candidate.contains(id)
    }

    /// Whether `id` sits anywhere in the staging area.
    pub fn contains(&self, id: usize) -> bool {
        self.candidate.contains(id) || self.temporal.contains(&id)
    }

    /// Blocks in both areas combined.
    pub fn len(&self) -> usize {
        self.temporal.len() + self.candidate.len()
    }

    /// Whether both areas are empty.
    pub fn is_empty(&self) -> bool {
        self.temporal.is_empty() && self.candidate.is_empty()
    }

    /// Blocks in the temporal area.
    pub fn temporal_len(&self) -> usize {
        self.temporal.len()
    }

    /// Blocks in the candidate area.
    pub fn candidate_len(&self) -> usize {
        self.candidate.len()
    }

    /// Whether fewer than `margin` blocks of usable headroom remain.
    pub fn is_full(&self, margin: usize) -> bool {
        self.occupancy.is_full(self.len(), margin)
    }

    /// Whether occupancy has crossed the proactive-eviction threshold.
    pub fn is_almost_full(&self) -> bool {
        self.occupancy.is_almost_full(self.len())
    }

    /// Whether the temporal area is down to at most one path of blocks.
    pub fn temporal_almost_empty(&self) -> bool {
        self.temporal.len() <= self.path_slots
    }

    /// Snapshot of the temporal ids (order unspecified).
    pub fn temporal_ids(&self) -> Vec<usize> {
        self.temporal.iter().copied().collect()
    }

    /// The candidate frequency structure.
    pub fn candidate(&self) -> &FrequencyBuckets {
        &self.candidate
    }

    /// Mutable access to the candidate frequency structure.
    pub fn candidate_mut(&mut self) -> &mut FrequencyBuckets {
        &mut self.candidate
    }

    /// Samples the current occupancy into the peak/last metrics.
    pub fn record_occupancy(&mut self) {
        self.occupancy.record(self.len());
    }

    /// Occupancy bookkeeping (peak/last/capacity).
    pub fn occupancy(&self) -> &OccupancyModel {
        &self.occupancy
    }
}
