//! Hierarchical composition of engines.
//!
//! A large position map cannot live on chip. The composer chains engines:
//! level 0 holds the real data, and each level `i + 1` is sized to hold
//! level `i`'s position map, packed `scale_factor[i + 1]` entries per
//! block. Derivation iterates until the residual position map fits the
//! configured on-chip budget; only that residue is assumed to live outside
//! any engine.
//!
//! An access touches the levels top-down: every upper level is refreshed
//! with a forced write (upper levels only need to stay consistent, not be
//! read for content), then the real operation runs on level 0. Returned
//! traffic is the sum across levels.

use tracing::info;

use crate::common::{BlockId, ConfigError, Operation};
use crate::config::{EngineConfig, HierarchyConfig, LatencyConfig};
use crate::core::engine::{AccessOutcome, OramEngine};
use crate::core::tree::Geometry;
use crate::stats::EngineStats;

/// Hard bound on derivation depth; reached only by degenerate parameters.
const MAX_HIERARCHY: usize = 20;

/// Derived configuration of one hierarchy level.
#[derive(Debug, Clone)]
pub struct LevelPlan {
    /// Working-set size in bytes at this level (level 0: the real data;
    /// above: the position map of the level below).
    pub data_size: u64,
    /// Tree utilization at this level.
    pub utilization: f64,
    /// Position-map entries of the parent level packed per block of this
    /// level; the largest power of two not exceeding (block bits / parent
    /// leaf-index bits). 1 at level 0.
    pub scale_factor: usize,
    /// Tree geometry this level's engine will derive.
    pub geometry: Geometry,
}

/// Full derivation result: one plan per level plus the on-chip residue.
#[derive(Debug, Clone)]
pub struct HierarchyPlan {
    /// Per-level plans, level 0 first.
    pub levels: Vec<LevelPlan>,
    /// Size in bytes of the position map left on chip.
    pub on_chip_map_bytes: u64,
}

impl HierarchyPlan {
    /// Derives the chain of level configurations for `data_set_size` bytes
    /// under `cfg`'s on-chip budget.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::BudgetNotExceeded`] when no recursion is needed.
    /// * [`ConfigError::HierarchyTooDeep`] when the budget is unreachable
    ///   within [`MAX_HIERARCHY`] levels.
    /// * Geometry errors from any level's parameters.
    pub fn derive(data_set_size: u64, cfg: &HierarchyConfig) -> Result<Self, ConfigError> {
        if data_set_size <= cfg.on_chip_budget {
            return Err(ConfigError::BudgetNotExceeded {
                data_set_size,
                budget: cfg.on_chip_budget,
            });
        }

        let mut levels = Vec::new();
        let mut data_size = data_set_size;
        let mut map_bytes = data_set_size;
        let mut scale_factor = 1usize;

        while map_bytes > cfg.on_chip_budget {
            let index = levels.len();
            if index >= MAX_HIERARCHY {
                return Err(ConfigError::HierarchyTooDeep {
                    limit: MAX_HIERARCHY,
                });
            }
            let params = cfg.level_params(index);
            let next_params = cfg.level_params(index + 1);

            let oram_size = (data_size as f64 / params.utilization).ceil() as u64;
            let geometry = Geometry::derive(
                data_size,
                oram_size,
                params.block_size,
                params.blocks_per_bucket,
            )?;
            let real_blocks = geometry.real_block_count as u64;
            let leaf_bits = geometry.level_count as u64;

            // One parent entry needs level_count bits; pack the largest
            // power-of-two count of entries into the child block.
            let raw_scale = next_params.block_size * 8 / leaf_bits;
            if raw_scale == 0 {
                return Err(ConfigError::InvalidParameter {
                    name: "block_size",
                    value: next_params.block_size.to_string(),
                });
            }
            let next_scale = 1u64 << raw_scale.ilog2();

            levels.push(LevelPlan {
                data_size,
                utilization: params.utilization,
                scale_factor,
                geometry,
            });

            map_bytes = real_blocks * leaf_bits / 8;
            data_size = real_blocks.div_ceil(next_scale) * next_params.block_size;
            scale_factor = next_scale as usize;
        }

        info!(
            hierarchy = levels.len(),
            on_chip_map_bytes = map_bytes,
            "derived hierarchy plan"
        );
        Ok(Self {
            levels,
            on_chip_map_bytes: map_bytes,
        })
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Chain of engines with top-down access propagation.
#[derive(Debug)]
pub struct Hierarchy<E: OramEngine> {
    engines: Vec<E>,
    plan: HierarchyPlan,
    accesses: u64,
}

impl<E: OramEngine> Hierarchy<E> {
    /// Derives the plan for `data_set_size` bytes and builds one engine per
    /// level, inheriting stash, threshold, and determinism settings from
    /// `template` (per-level seeds are offset so levels draw independent
    /// streams).
    ///
    /// # Errors
    ///
    /// Propagates [`ConfigError`] from the plan derivation or any level's
    /// engine construction.
    pub fn new(
        data_set_size: u64,
        cfg: &HierarchyConfig,
        template: &EngineConfig,
        latency: &LatencyConfig,
    ) -> Result<Self, ConfigError> {
        let plan = HierarchyPlan::derive(data_set_size, cfg)?;
        let mut engines = Vec::with_capacity(plan.depth());
        for (i, level) in plan.levels.iter().enumerate() {
            let level_cfg = EngineConfig {
                data_set_size: level.data_size,
                block_size: level.geometry.block_size,
                blocks_per_bucket: level.geometry.blocks_per_bucket,
                utilization: level.utilization,
                seed: template.seed.map(|s| s.wrapping_add(i as u64)),
                ..template.clone()
            };
            let engine = E::from_config(&level_cfg, latency)?;
            debug_assert_eq!(
                engine.geometry(),
                &level.geometry,
                "engine and plan disagree on level geometry"
            );
            engines.push(engine);
        }
        Ok(Self {
            engines,
            plan,
            accesses: 0,
        })
    }

    /// The derivation result backing this hierarchy.
    pub fn plan(&self) -> &HierarchyPlan {
        &self.plan
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.engines.len()
    }

    /// Splits a logical id into one address per level by iterated integer
    /// division with the per-level scale factors.
    ///
    /// # Panics
    ///
    /// Panics if any derived address is negative, which would indicate a
    /// negative id reaching decomposition.
    pub fn generate_address(&self, id: BlockId) -> Vec<BlockId> {
        let mut address = Vec::with_capacity(self.depth());
        let mut current = id;
        address.push(current);
        for level in self.plan.levels.iter().skip(1) {
            current /= level.scale_factor as BlockId;
            assert!(current >= 0, "address decomposition went negative");
            address.push(current);
        }
        address
    }

    /// Performs one hierarchical access.
    ///
    /// A negative `id` triggers background eviction on every level, highest
    /// first. Otherwise levels `depth - 1 .. 1` are refreshed with forced
    /// writes and the real operation runs on level 0. The outcome carries
    /// the summed traffic and level 0's block-level results.
    ///
    /// # Panics
    ///
    /// Panics if any level's stash is full on a non-dummy access.
    pub fn access(&mut self, id: BlockId, op: Operation, data: i64) -> AccessOutcome {
        self.accesses += 1;
        let mut outcome = AccessOutcome::default();

        if id < 0 {
            for engine in self.engines.iter_mut().rev() {
                outcome.traffic += engine.background_eviction();
            }
            return outcome;
        }

        for engine in &self.engines {
            assert!(
                !engine.stash_is_full(),
                "hierarchy access with a full stash"
            );
        }

        let address = self.generate_address(id);
        for i in (1..self.engines.len()).rev() {
            outcome.traffic += self.engines[i]
                .access(address[i], Operation::Write, -1)
                .traffic;
        }
        let leaf = self.engines[0].access(address[0], op, data);
        outcome.traffic += leaf.traffic;
        outcome.data = leaf.data;
        outcome.stash_hit = leaf.stash_hit;
        outcome.created = leaf.created;
        outcome.read_error = leaf.read_error;
        outcome
    }

    /// Whether any level has crossed its proactive-eviction threshold.
    pub fn any_stash_almost_full(&self) -> bool {
        self.engines.iter().any(OramEngine::stash_is_almost_full)
    }

    /// Drains every level below its threshold via dummy accesses; returns
    /// the traffic generated.
    pub fn background_eviction(&mut self) -> u64 {
        let mut traffic = 0;
        while self.any_stash_almost_full() {
            traffic += self.access(-1, Operation::Dummy, -1).traffic;
        }
        traffic
    }

    /// Hierarchical accesses issued (each may touch every level).
    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    /// The engine at `level` (0 = data level).
    pub fn level(&self, level: usize) -> &E {
        &self.engines[level]
    }

    /// Statistics snapshot of the engine at `level`.
    pub fn level_stats(&self, level: usize) -> EngineStats {
        self.engines[level].stats()
    }

    /// Counters summed across all levels.
    pub fn merged_stats(&self) -> EngineStats {
        self.engines
            .iter()
            .map(OramEngine::stats)
            .fold(EngineStats::default(), |acc, s| acc.merged(&s))
    }

    /// Clears every level's counters.
    pub fn reset_stats(&mut self) {
        for engine in &mut self.engines {
            engine.reset_stats();
        }
    }

    /// Replaces the latency parameters on every level.
    pub fn set_latency(&mut self, latency: LatencyConfig) {
        for engine in &mut self.engines {
            engine.set_latency(latency);
        }
    }
}
