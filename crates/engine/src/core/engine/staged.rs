//! Enhanced engine with staged, frequency-aware eviction.
//!
//! Differences from the baseline engine:
//! 1. Blocks swept off a path land in a temporal area; the requested block
//!    (and any block requested again later) is promoted into a
//!    frequency-bucketed candidate area instead.
//! 2. A path is only written back once staging occupancy crosses the fill
//!    threshold, and the write drains the temporal area alone.
//! 3. When the candidate area also outgrows the tree depth, a merge pass
//!    snapshots the frequency groups and a kick-out pass bin-packs each
//!    group onto a best-fit path chosen by per-path free-slot counts,
//!    remapping every block it places.

use tracing::{debug, warn};

use super::binpack::find_best_fit_path;
use super::{AccessOutcome, EngineCore, OramEngine, intersection_level};
use crate::common::{BlockId, ConfigError, EMPTY_SLOT, Operation};
use crate::config::{EngineConfig, LatencyConfig};
use crate::core::stash::StagingArea;
use crate::core::tree::Geometry;
use crate::stats::EngineStats;

/// PCD-ORAM engine: staged eviction with bin-packed batch kick-out.
#[derive(Debug)]
pub struct StagedEngine {
    core: EngineCore,
    staging: StagingArea,
}

impl StagedEngine {
    /// Builds an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] for invalid geometry, stash, or threshold
    /// parameters.
    pub fn new(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError> {
        let core = EngineCore::new(cfg, latency)?;
        let staging = StagingArea::new(
            cfg.stash_capacity,
            core.geom.path_slots(),
            cfg.fill_threshold,
        );
        Ok(Self { core, staging })
    }

    /// Looks for `id` in the staging area, promoting it on a hit.
    ///
    /// A candidate hit bumps the block's frequency; a temporal hit moves
    /// the block into the candidate area at frequency 1.
    fn scan_staging(&mut self, id: usize) -> bool {
        if self.staging.candidate_contains(id) {
            let _ = self.staging.promote(id);
            true
        } else if self.staging.temporal_contains(id) {
            self.staging.remove_temporal(id);
            let _ = self.staging.promote(id);
            true
        } else {
            false
        }
    }

    /// Considers every temporal block for eviction against the path to
    /// `cur_pos`. Candidates are deliberately left alone; they only leave
    /// through the kick-out pass.
    fn pick_blocks_to_evict(&mut self, cur_pos: usize) {
        for id in self.staging.temporal_ids() {
            let intersection = intersection_level(
                &self.core.geom,
                self.core.position_map.leaf_of(id),
                cur_pos,
            );
            if self.core.evict_queue.try_place(intersection, id) {
                self.staging.remove_temporal(id);
            }
        }
    }

    /// Merge-and-kick-out pass: drains the candidate area group by group,
    /// ascending by frequency, bin-packing each group onto best-fit paths.
    /// Returns the traffic (one slot write per block placed).
    fn kick_out(&mut self) -> u64 {
        self.core.stats.merge_passes += 1;
        // Merge: snapshot the per-frequency population before draining.
        let histogram = self.staging.candidate().histogram();
        let mut traffic = 0u64;

        for (freq, count) in histogram {
            debug!(freq, count, "kicking out frequency group");
            let group = self.staging.candidate_mut().take_group(freq);
            let mut placed_total = 0;
            while placed_total < group.len() {
                let needed = group.len() - placed_total;
                let fit = find_best_fit_path(&self.core.geom, &self.core.slots, needed);
                if fit.adequate {
                    self.core.stats.adequate_allocations += 1;
                } else {
                    self.core.stats.under_allocations += 1;
                }
                let leaf = self.core.geom.leaf_from_ordinal(fit.leaf_ordinal);
                let placed = self.place_along_path(&group[placed_total..], leaf);
                if placed == 0 {
                    // Every path is full; the remainder cannot be placed in
                    // this pass. Re-stage it rather than spin.
                    warn!(remaining = needed, "kick-out found no free slot");
                    for &id in &group[placed_total..] {
                        let _ = self.staging.candidate_mut().touch(id);
                    }
                    break;
                }
                placed_total += placed;
                traffic += placed as u64;
            }
        }
        traffic
    }

    /// Places blocks into the empty slots of the path to `leaf` in
    /// root-to-leaf order, remapping each placed block to `leaf`. Returns
    /// how many were placed.
    fn place_along_path(&mut self, blocks: &[usize], leaf: usize) -> usize {
        let buckets: Vec<usize> = self.core.geom.path(leaf).collect();
        let mut placed = 0;
        'path: for &bucket in buckets.iter().rev() {
            let base = self.core.slots.bucket_base(bucket);
            for j in 0..self.core.geom.blocks_per_bucket {
                if placed == blocks.len() {
                    break 'path;
                }
                let slot = base + j;
                if self.core.slots.get(slot) != EMPTY_SLOT {
                    continue;
                }
                let id = blocks[placed];
                self.core.slots.set(slot, id as BlockId);
                self.core.stats.real_block_writes.bump(self.core.class);
                self.core.stats.ready_latency += self.core.latency.write_back_cycles;
                self.core.remap(id, leaf);
                placed += 1;
            }
        }
        placed
    }

    /// Mirrors the staging occupancy metrics into the statistics snapshot.
    fn record_occupancy(&mut self) {
        self.staging.record_occupancy();
        self.core.stats.stash_peak_occupancy = self.staging.occupancy().peak();
        self.core.stats.stash_last_occupancy = self.staging.occupancy().last();
    }

    /// The staging area (read-only).
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// The tree slot storage (read-only).
    pub fn tree(&self) -> &crate::core::tree::TreeSlots {
        &self.core.slots
    }

    /// The position map (read-only).
    pub fn position_map(&self) -> &crate::core::position::PositionMap {
        &self.core.position_map
    }

    /// Whether `id` has ever been written.
    pub fn is_present(&self, id: usize) -> bool {
        self.core.present[id]
    }
}

impl OramEngine for StagedEngine {
    fn from_config(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError> {
        Self::new(cfg, latency)
    }

    fn access(&mut self, id: BlockId, op: Operation, data: i64) -> AccessOutcome {
        assert!(
            !self.staging.is_full(0) || op == Operation::Dummy,
            "staging area full on a non-dummy access; eviction cadence was not kept"
        );
        let id = self.core.begin_access(id, op);
        let mut outcome = AccessOutcome::default();

        if op == Operation::WriteBack {
            self.staging.remove_temporal(id);
            let _ = self.staging.promote(id);
            self.core.present[id] = true;
            self.core.payload[id] = data;
            debug!(id, "block written back from the outer cache layer");
            return outcome;
        }

        self.core.evict_queue.reset();
        let cur_pos = self.core.position_map.leaf_of(id);
        let new_pos = self.core.sample_new_leaf(id);

        if self.scan_staging(id) {
            self.core.stats.stash_hits.bump(self.core.class);
            self.core.stats.hit_latency += self.core.latency.hit_directly_cycles;
            outcome.stash_hit = true;
            debug!(id, "request served from the staging area");
            self.core.serve_payload(id, op, data, &mut outcome);
        } else {
            self.core.stats.memory_accesses.bump(self.core.class);
            self.core.stats.stash_misses.bump(self.core.class);
            debug!(id, cur_pos, "staging miss, reading path");

            let staging = &mut self.staging;
            outcome.traffic += self.core.read_path(cur_pos, |swept| {
                if swept == id {
                    let _ = staging.promote(swept);
                } else {
                    staging.put_temporal(swept);
                }
            });
            self.core.stats.path_reads.bump(self.core.class);

            if self.core.present[id] {
                self.core.serve_payload(id, op, data, &mut outcome);
            } else {
                match op {
                    Operation::Read => {
                        outcome.read_error = true;
                        self.core.stats.read_errors += 1;
                        warn!(id, "read of a block that was never written");
                    }
                    Operation::Write => {
                        self.core.present[id] = true;
                        self.core.payload[id] = data;
                        let _ = self.staging.promote(id);
                        outcome.created = true;
                        debug!(id, "created a new block");
                    }
                    Operation::WriteBack | Operation::Dummy => {}
                }
            }
        }

        self.record_occupancy();
        self.core.remap(id, new_pos);

        if outcome.stash_hit {
            return outcome;
        }

        if self.staging.is_almost_full() {
            self.pick_blocks_to_evict(cur_pos);
            outcome.traffic += self.core.write_path(cur_pos);
            self.core.stats.path_writes.bump(self.core.class);

            if self.staging.is_almost_full()
                && self.staging.candidate_len() > self.core.geom.level_count
            {
                debug!(
                    candidates = self.staging.candidate_len(),
                    "candidate area over threshold, merging and kicking out"
                );
                outcome.traffic += self.kick_out();
                self.core.stats.path_writes.bump(self.core.class);
            }
        }
        outcome
    }

    fn background_eviction(&mut self) -> u64 {
        let mut traffic = 0;
        while self.staging.is_almost_full() {
            debug!("background eviction");
            traffic += self.access(-1, Operation::Dummy, -1).traffic;
        }
        traffic
    }

    fn stash_is_full(&self) -> bool {
        self.staging.is_full(0)
    }

    fn stash_is_almost_full(&self) -> bool {
        self.staging.is_almost_full()
    }

    fn geometry(&self) -> &Geometry {
        &self.core.geom
    }

    fn stats(&self) -> EngineStats {
        self.core.stats.clone()
    }

    fn reset_stats(&mut self) {
        self.core.stats.reset();
    }

    fn set_latency(&mut self, latency: LatencyConfig) {
        self.core.latency = latency;
    }
}
