//! Path engines: the access state machines driving the oblivious protocol.
//!
//! This module defines:
//! 1. **The engine seam:** [`OramEngine`], implemented by both variants and
//!    consumed by the hierarchical composer.
//! 2. **Shared machinery:** The engine core (tree, position map, payloads,
//!    RNG, counters), the per-level eviction queue, and the intersection
//!    search used to place stash blocks along a path.
//! 3. **Variants:** The baseline engine (classical Path ORAM) and the
//!    staged engine (frequency-aware staging with bin-packed kick-out).

/// Classical Path ORAM engine.
pub mod baseline;

/// Quantity map and best-fit path search for batch eviction.
pub mod binpack;

/// Enhanced engine with staged eviction.
pub mod staged;

pub use baseline::BaselineEngine;
pub use staged::StagedEngine;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::common::{AccessClass, BlockId, ConfigError, EMPTY_SLOT, Operation};
use crate::config::{EngineConfig, LatencyConfig};
use crate::core::position::PositionMap;
use crate::core::tree::{Geometry, TreeSlots};
use crate::stats::EngineStats;

/// Result of one engine access.
///
/// The traffic count (slots touched) is the primary accounting output; the
/// remaining fields describe what happened to the requested block.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessOutcome {
    /// Tree slots touched (reads plus writes).
    pub traffic: u64,
    /// Payload read back, for reads of an existing block.
    pub data: Option<i64>,
    /// Whether the request was served from the stash/staging area.
    pub stash_hit: bool,
    /// Whether a write created a previously nonexistent block.
    pub created: bool,
    /// Whether a read addressed a block that was never written.
    pub read_error: bool,
}

/// Access seam implemented by both engine variants.
///
/// The hierarchical composer drives engines exclusively through this trait;
/// it never reaches into variant-specific structures.
pub trait OramEngine {
    /// Builds an engine from its configuration.
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] for invalid geometry, stash, or threshold
    /// parameters.
    fn from_config(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError>
    where
        Self: Sized;

    /// Performs one logical access.
    ///
    /// A negative `id` requests a dummy access that only drives eviction.
    ///
    /// # Panics
    ///
    /// Panics if the stash is full and the operation is not
    /// [`Operation::Dummy`]; the caller is responsible for keeping eviction
    /// cadence via [`OramEngine::background_eviction`].
    fn access(&mut self, id: BlockId, op: Operation, data: i64) -> AccessOutcome;

    /// Issues dummy accesses until occupancy drops below the fill
    /// threshold; returns the traffic generated.
    fn background_eviction(&mut self) -> u64;

    /// Whether the stash/staging area has no usable headroom left.
    fn stash_is_full(&self) -> bool;

    /// Whether occupancy has crossed the proactive-eviction threshold.
    fn stash_is_almost_full(&self) -> bool;

    /// The engine's tree geometry.
    fn geometry(&self) -> &Geometry;

    /// Snapshot of the engine's counters.
    fn stats(&self) -> EngineStats;

    /// Clears every counter back to zero.
    fn reset_stats(&mut self);

    /// Replaces the latency parameters; intended before load is applied.
    fn set_latency(&mut self, latency: LatencyConfig);
}

/// Per-level staging queue for one path write.
///
/// Row 0 corresponds to the root, row `level_count - 1` to the leaf; the
/// path write applies row `(level_count - 1 - i)` at walk step `i`, so
/// writes land in root-to-leaf order.
#[derive(Debug, Clone)]
pub(crate) struct EvictQueue {
    slots: Vec<BlockId>,
    counts: Vec<usize>,
    blocks_per_bucket: usize,
}

impl EvictQueue {
    pub(crate) fn new(level_count: usize, blocks_per_bucket: usize) -> Self {
        Self {
            slots: vec![EMPTY_SLOT; level_count * blocks_per_bucket],
            counts: vec![0; level_count],
            blocks_per_bucket,
        }
    }

    /// Clears the queue before a new access.
    pub(crate) fn reset(&mut self) {
        self.slots.fill(EMPTY_SLOT);
        self.counts.fill(0);
    }

    /// Tries to place `id` in the deepest row strictly above the
    /// intersection level that still has a free slot.
    ///
    /// Scans rows `intersection - 1` down to 0; returns whether a slot was
    /// claimed.
    pub(crate) fn try_place(&mut self, intersection: usize, id: usize) -> bool {
        let mut row = intersection;
        while row > 0 {
            row -= 1;
            if self.counts[row] < self.blocks_per_bucket {
                self.slots[row * self.blocks_per_bucket + self.counts[row]] = id as BlockId;
                self.counts[row] += 1;
                return true;
            }
        }
        false
    }

    /// Id staged at position `j` of `row`, or [`EMPTY_SLOT`].
    pub(crate) fn get(&self, row: usize, j: usize) -> BlockId {
        self.slots[row * self.blocks_per_bucket + j]
    }
}

/// Depth at which the paths to two leaves diverge.
///
/// Both leaves are treated as points in the leaf range; the range is halved
/// repeatedly until the two no longer fit in the same half, and the number
/// of halving steps is returned. Identical leaves yield `level_count`
/// (their paths coincide everywhere).
pub(crate) fn intersection_level(geom: &Geometry, block_pos: usize, cur_pos: usize) -> usize {
    let (low, high) = if block_pos > cur_pos {
        (cur_pos, block_pos)
    } else {
        (block_pos, cur_pos)
    };
    if low == high {
        return geom.level_count;
    }

    let mut left = geom.first_leaf();
    let mut right = geom.last_leaf();
    let mut intersection = 0;
    while intersection <= geom.level_count {
        intersection += 1;
        let mid = (right - left) / 2 + 1;
        if low <= right - mid && high >= left + mid {
            return intersection;
        } else if high <= right - mid {
            right -= mid;
        } else if low >= left + mid {
            left += mid;
        }
    }
    debug_assert!(false, "leaves {low} and {high} outside the leaf range");
    0
}

/// State shared by both engine variants.
///
/// Owns the tree, the position map, block presence/payload tables, the
/// eviction queue, the RNG, and the counters. The variants add their stash
/// structure and the eviction policy around it.
#[derive(Debug)]
pub(crate) struct EngineCore {
    pub(crate) geom: Geometry,
    pub(crate) slots: TreeSlots,
    pub(crate) position_map: PositionMap,
    /// Whether each id (including the dummy id) has ever been written.
    pub(crate) present: Vec<bool>,
    /// Opaque payload per block id; travels with the block by construction.
    pub(crate) payload: Vec<i64>,
    pub(crate) evict_queue: EvictQueue,
    pub(crate) rng: StdRng,
    pub(crate) stats: EngineStats,
    pub(crate) latency: LatencyConfig,
    /// Counter class of the access in flight.
    pub(crate) class: AccessClass,
}

impl EngineCore {
    pub(crate) fn new(cfg: &EngineConfig, latency: &LatencyConfig) -> Result<Self, ConfigError> {
        if !(cfg.utilization > 0.0 && cfg.utilization < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "utilization",
                value: cfg.utilization.to_string(),
            });
        }
        if !(cfg.fill_threshold > 0.0 && cfg.fill_threshold <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "fill_threshold",
                value: cfg.fill_threshold.to_string(),
            });
        }

        let geom = Geometry::derive(
            cfg.data_set_size,
            cfg.oram_size(),
            cfg.block_size,
            cfg.blocks_per_bucket,
        )?;
        if cfg.stash_capacity <= geom.path_slots() {
            return Err(ConfigError::StashTooSmall {
                capacity: cfg.stash_capacity,
                path_slots: geom.path_slots(),
            });
        }

        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let position_map = PositionMap::new(&geom, &mut rng);

        info!(
            block_count = geom.block_count,
            real_block_count = geom.real_block_count,
            bucket_count = geom.bucket_count,
            level_count = geom.level_count,
            leaf_count = geom.leaf_count,
            oram_size = geom.oram_size,
            "configured engine"
        );

        Ok(Self {
            slots: TreeSlots::new(geom.block_count, geom.blocks_per_bucket),
            position_map,
            present: vec![false; geom.real_block_count + 1],
            payload: vec![-1; geom.real_block_count + 1],
            evict_queue: EvictQueue::new(geom.level_count, geom.blocks_per_bucket),
            rng,
            stats: EngineStats::default(),
            latency: *latency,
            class: AccessClass::Real,
            geom,
        })
    }

    /// Resolves the boundary id, sets the counter class, and bumps the
    /// access counters. Negative ids map to the dummy id; ids past the id
    /// space are redrawn uniformly over the real blocks.
    pub(crate) fn begin_access(&mut self, id: BlockId, op: Operation) -> usize {
        let dummy_id = self.geom.real_block_count;
        let id = if id < 0 {
            dummy_id
        } else if id as usize > dummy_id {
            self.rng.gen_range(0..dummy_id)
        } else {
            id as usize
        };

        self.class = op.access_class();
        self.stats.accesses += 1;
        if id == dummy_id {
            self.stats.dummy_accesses += 1;
        } else {
            self.stats.actual_accesses += 1;
        }
        id
    }

    /// Samples a fresh leaf for `id`, distinct from its current one.
    pub(crate) fn sample_new_leaf(&mut self, id: usize) -> usize {
        self.position_map.sample_fresh_leaf(id, &mut self.rng)
    }

    /// Commits a new leaf for `id` and charges the remap cost.
    pub(crate) fn remap(&mut self, id: usize, leaf: usize) {
        self.position_map.remap(id, leaf);
        self.stats.ready_latency += self.latency.remap_cycles;
    }

    /// Reads the full path to `leaf`, feeding every resident block id to
    /// `sink` and clearing its slot. Returns the traffic generated.
    pub(crate) fn read_path(&mut self, leaf: usize, mut sink: impl FnMut(usize)) -> u64 {
        for bucket in self.geom.path(leaf) {
            let base = self.slots.bucket_base(bucket);
            for j in 0..self.geom.blocks_per_bucket {
                let slot = base + j;
                let id = self.slots.get(slot);
                if id == EMPTY_SLOT {
                    self.stats.empty_block_reads.bump(self.class);
                } else {
                    self.stats.real_block_reads.bump(self.class);
                    sink(id as usize);
                    self.slots.clear(slot);
                }
            }
        }
        let path_slots = self.geom.path_slots() as u64;
        self.stats.hit_latency += self.latency.hit_through_mem_cycles * path_slots;
        path_slots
    }

    /// Writes the eviction queue onto the path to `leaf` in root-to-leaf
    /// order, overwriting every slot on the path. Returns the traffic.
    pub(crate) fn write_path(&mut self, leaf: usize) -> u64 {
        let mut traffic = 0u64;
        for (i, bucket) in self.geom.path(leaf).enumerate() {
            let row = self.geom.level_count - 1 - i;
            let base = self.slots.bucket_base(bucket);
            for j in 0..self.geom.blocks_per_bucket {
                traffic += 1;
                let id = self.evict_queue.get(row, j);
                if id == EMPTY_SLOT {
                    self.stats.empty_block_writes.bump(self.class);
                } else {
                    self.stats.real_block_writes.bump(self.class);
                }
                self.slots.set(base + j, id);
            }
        }
        self.stats.ready_latency +=
            self.latency.write_back_cycles * self.geom.path_slots() as u64;
        traffic
    }

    /// Applies the payload side of a read or write to an existing block.
    pub(crate) fn serve_payload(
        &mut self,
        id: usize,
        op: Operation,
        data: i64,
        outcome: &mut AccessOutcome,
    ) {
        match op {
            Operation::Read => outcome.data = Some(self.payload[id]),
            Operation::Write => self.payload[id] = data,
            Operation::WriteBack | Operation::Dummy => {}
        }
    }
}
