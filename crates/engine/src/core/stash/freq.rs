//! O(1) LFU frequency buckets.
//!
//! Tracks an access-frequency counter per block id and partitions the ids
//! into groups sharing the same counter value. Promotion on a repeat touch
//! is O(1): remove from group *f*, insert into group *f + 1*, with a
//! per-id index recording (frequency, slot-in-group) so removal never
//! scans. Group order within a frequency is not significant.
//!
//! This is the candidate area of the staged engine's staging structure,
//! factored out so it can be exercised independently of any tree logic.

use std::collections::{BTreeMap, HashMap};

/// Frequency-bucketed id set with O(1) touch and remove.
#[derive(Debug, Clone, Default)]
pub struct FrequencyBuckets {
    /// id -> (frequency, position within the frequency's group).
    index: HashMap<usize, (u64, usize)>,
    /// frequency -> ids sharing that counter value. Ordered so drains can
    /// walk frequencies ascending.
    groups: BTreeMap<u64, Vec<usize>>,
}

impl FrequencyBuckets {
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked ids.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no ids are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: usize) -> bool {
        self.index.contains_key(&id)
    }

    /// Current frequency of `id`, if tracked.
    pub fn frequency(&self, id: usize) -> Option<u64> {
        self.index.get(&id).map(|&(freq, _)| freq)
    }

    /// Records a touch of `id` and returns its new frequency.
    ///
    /// An untracked id is inserted at frequency 1; a tracked id moves from
    /// its group to the next one in O(1).
    pub fn touch(&mut self, id: usize) -> u64 {
        let next = match self.index.get(&id) {
            Some(&(freq, pos)) => {
                self.remove_at(freq, pos);
                freq + 1
            }
            None => 1,
        };
        let group = self.groups.entry(next).or_default();
        self.index.insert(id, (next, group.len()));
        group.push(id);
        next
    }

    /// Removes `id`, returning its frequency if it was tracked.
    pub fn remove(&mut self, id: usize) -> Option<u64> {
        let (freq, pos) = self.index.remove(&id)?;
        self.remove_at(freq, pos);
        Some(freq)
    }

    /// Snapshot of (frequency, group size), ascending by frequency.
    ///
    /// This is the merge step of the batch eviction pass: the drain that
    /// follows consumes groups in exactly this order.
    pub fn histogram(&self) -> Vec<(u64, usize)> {
        self.groups
            .iter()
            .map(|(&freq, group)| (freq, group.len()))
            .collect()
    }

    /// Highest frequency currently present, or 0 when empty.
    pub fn max_frequency(&self) -> u64 {
        self.groups.keys().next_back().copied().unwrap_or(0)
    }

    /// Removes and returns the whole group at `freq` (empty if absent).
    pub fn take_group(&mut self, freq: u64) -> Vec<usize> {
        let group = self.groups.remove(&freq).unwrap_or_default();
        for id in &group {
            let _ = self.index.remove(id);
        }
        group
    }

    /// Unlinks the entry at `pos` within the group of `freq`, fixing up the
    /// index of the entry swapped into its place.
    fn remove_at(&mut self, freq: u64, pos: usize) {
        let Some(group) = self.groups.get_mut(&freq) else {
            debug_assert!(false, "index and groups agree on membership");
            return;
        };
        let _ = group.swap_remove(pos);
        if let Some(&moved) = group.get(pos) {
            if let Some(entry) = self.index.get_mut(&moved) {
                entry.1 = pos;
            }
        }
        if group.is_empty() {
            let _ = self.groups.remove(&freq);
        }
    }
}
