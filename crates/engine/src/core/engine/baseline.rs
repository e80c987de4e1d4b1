//! Classical Path ORAM engine.
//!
//! One access: remap, scan the stash, read the path to the block's current
//! leaf (read-and-clear), serve or create the block, then evict against the
//! just-read path and write it back. Every access that touched the tree
//! writes a path; a stash hit generates no tree traffic at all.

use tracing::{debug, warn};

use super::{AccessOutcome, EngineCore, OramEngine, intersection_level};
use crate::common::{BlockId, ConfigError, Operation};
use crate::config::{EngineConfig, LatencyConfig};
use crate::core::stash::Stash;
use crate::core::tree::Geometry;
use crate::stats::EngineStats;

/// Path ORAM engine with an ordered stash and per-access path writes.
#[derive(Debug)]
pub struct BaselineEngine {
    core: EngineCore,
    stash: Stash,
}

impl BaselineEngine {
    /// Builds an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] for invalid geometry, stash, or threshold
    /// parameters.
    pub fn new(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError> {
        let core = EngineCore::new(cfg, latency)?;
        let stash = Stash::new(
            cfg.stash_capacity,
            core.geom.path_slots(),
            cfg.fill_threshold,
        );
        Ok(Self { core, stash })
    }

    /// Considers every stash block for eviction against the path to
    /// `cur_pos`, placing each into the deepest queue level at or above its
    /// intersection with that path. Unplaced blocks stay in the stash.
    fn pick_blocks_to_evict(&mut self, cur_pos: usize) {
        let geom = &self.core.geom;
        let position_map = &self.core.position_map;
        let queue = &mut self.core.evict_queue;
        self.stash.retain(|&id| {
            let intersection = intersection_level(geom, position_map.leaf_of(id), cur_pos);
            !queue.try_place(intersection, id)
        });
    }

    /// Mirrors the stash occupancy metrics into the statistics snapshot.
    fn record_occupancy(&mut self) {
        self.stash.record_occupancy();
        self.core.stats.stash_peak_occupancy = self.stash.occupancy().peak();
        self.core.stats.stash_last_occupancy = self.stash.occupancy().last();
    }

    /// The stash (read-only).
    pub fn stash(&self) -> &Stash {
        &self.stash
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

impl OramEngine for BaselineEngine {
    fn from_config(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError> {
        Self::new(cfg, latency)
    }

    fn access(&mut self, id: BlockId, op: Operation, data: i64) -> AccessOutcome {
        assert!(
            !self.stash.is_full(0) || op == Operation::Dummy,
            "stash full on a non-dummy access; eviction cadence was not kept"
        );
        let id = self.core.begin_access(id, op);
        let mut outcome = AccessOutcome::default();

        if op == Operation::WriteBack {
            assert!(
                !self.core.present[id],
                "write-back of a block already present"
            );
            self.stash.push(id);
            self.core.present[id] = true;
            self.core.payload[id] = data;
            debug!(id, "block written back from the outer cache layer");
            return outcome;
        }

        self.core.evict_queue.reset();
        let cur_pos = self.core.position_map.leaf_of(id);
        let new_pos = self.core.sample_new_leaf(id);

        if self.stash.contains(id) {
            self.core.stats.stash_hits.bump(self.core.class);
            self.core.stats.hit_latency += self.core.latency.hit_directly_cycles;
            outcome.stash_hit = true;
            debug!(id, "request served from the stash");
            self.core.serve_payload(id, op, data, &mut outcome);
        } else {
            self.core.stats.memory_accesses.bump(self.core.class);
            self.core.stats.stash_misses.bump(self.core.class);
            debug!(id, cur_pos, "stash miss, reading path");

            let stash = &mut self.stash;
            outcome.traffic += self.core.read_path(cur_pos, |swept| stash.push(swept));
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
                        self.stash.push(id);
                        outcome.created = true;
                        debug!(id, "created a new block");
                    }
                    Operation::WriteBack | Operation::Dummy => {}
                }
            }
        }

        self.record_occupancy();
        self.core.remap(id, new_pos);

        if !outcome.stash_hit {
            self.pick_blocks_to_evict(cur_pos);
            outcome.traffic += self.core.write_path(cur_pos);
            self.core.stats.path_writes.bump(self.core.class);
        }
        outcome
    }

    fn background_eviction(&mut self) -> u64 {
        let mut traffic = 0;
        while self.stash.is_almost_full() {
            debug!("background eviction");
            traffic += self.access(-1, Operation::Dummy, -1).traffic;
        }
        traffic
    }

    fn stash_is_full(&self) -> bool {
        self.stash.is_full(0)
    }

    fn stash_is_almost_full(&self) -> bool {
        self.stash.is_almost_full()
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
