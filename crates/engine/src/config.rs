//! Configuration system for the oblivious storage simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline constants (geometry, stash, latency, workload).
//! 2. **Structures:** Hierarchical config for the engine, latency model,
//!    recursive hierarchy, and workload sections.
//! 3. **Enums:** Engine variant and workload kind selectors.
//!
//! Configuration is supplied via JSON (`serde_json`) or `Config::default()`.
//! Validation happens in the constructors that consume these values and is
//! reported through [`crate::common::ConfigError`].

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline simulation when not explicitly
/// overridden in a JSON configuration.
mod defaults {
    /// Default working-set size in bytes (1 MiB).
    pub const DATA_SET_SIZE: u64 = 1024 * 1024;

    /// Default block size in bytes.
    ///
    /// Matches a typical cache-line granularity; position-map recursion
    /// packs leaf indices into blocks of this size.
    pub const BLOCK_SIZE: u64 = 64;

    /// Default blocks per bucket (the "Z" parameter).
    ///
    /// Z = 4 is the conservative setting from the Path ORAM literature;
    /// smaller Z raises the stash-overflow probability.
    pub const BLOCKS_PER_BUCKET: usize = 4;

    /// Default tree utilization: the working set occupies half the tree.
    pub const UTILIZATION: f64 = 0.5;

    /// Default stash capacity in blocks.
    ///
    /// Must exceed `Z * level_count` so one full path always fits.
    pub const STASH_CAPACITY: usize = 256;

    /// Default stash fill threshold triggering proactive eviction.
    pub const FILL_THRESHOLD: f64 = 0.7;

    /// Default on-chip position-map budget in bytes (8 KiB).
    pub const ON_CHIP_BUDGET: u64 = 8 * 1024;

    /// Cycles charged when a request is served directly from the stash.
    pub const HIT_DIRECTLY_CYCLES: u64 = 2;

    /// Cycles charged per slot when a request goes through the tree.
    pub const HIT_THROUGH_MEM_CYCLES: u64 = 100;

    /// Cycles charged for one position-map remap.
    pub const REMAP_CYCLES: u64 = 2;

    /// Cycles charged per slot written back to the tree.
    pub const WRITE_BACK_CYCLES: u64 = 100;

    /// Default number of workload requests.
    pub const ACCESSES: u64 = 10_000;

    /// Default fraction of reads in the uniform workload mix.
    pub const READ_FRACTION: f64 = 0.5;
}

/// Engine variant selector.
///
/// Chooses the eviction subsystem: the classical construction writes a path
/// back after every tree access, the staged construction batches evictions
/// through a frequency-aware staging area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Classical Path ORAM: plain stash, per-access path write.
    Baseline,
    /// PCD-ORAM: temporal/candidate staging, threshold-gated path writes,
    /// and bin-packed batch kick-out.
    #[default]
    Staged,
}

/// Synthetic workload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadKind {
    /// Writes to distinct sequential ids.
    #[default]
    Sequential,
    /// Uniformly random ids with a configurable read fraction, after a
    /// sequential warm-up pass that writes every id once.
    Uniform,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use oramsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.engine.blocks_per_bucket, 4);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use oramsim_core::config::{Config, Variant};
///
/// let json = r#"{
///     "engine": {
///         "data_set_size": 65536,
///         "block_size": 64,
///         "blocks_per_bucket": 4,
///         "utilization": 0.5,
///         "stash_capacity": 256,
///         "variant": "baseline",
///         "seed": 7
///     },
///     "latency": { "hit_through_mem_cycles": 120 },
///     "hierarchy": { "on_chip_budget": 4096 },
///     "workload": { "accesses": 1000 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.engine.variant, Variant::Baseline);
/// assert_eq!(config.latency.hit_through_mem_cycles, 120);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Engine geometry and stash settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Additive latency model parameters.
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Recursive hierarchy settings.
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    /// Synthetic workload settings.
    #[serde(default)]
    pub workload: WorkloadConfig,
}

/// Geometry, stash, and determinism settings for one engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Working-set size in bytes.
    #[serde(default = "EngineConfig::default_data_set_size")]
    pub data_set_size: u64,

    /// Block size in bytes.
    #[serde(default = "EngineConfig::default_block_size")]
    pub block_size: u64,

    /// Blocks per bucket (Z).
    #[serde(default = "EngineConfig::default_blocks_per_bucket")]
    pub blocks_per_bucket: usize,

    /// Fraction of the tree occupied by the working set (0, 1).
    #[serde(default = "EngineConfig::default_utilization")]
    pub utilization: f64,

    /// Stash capacity in blocks.
    #[serde(default = "EngineConfig::default_stash_capacity")]
    pub stash_capacity: usize,

    /// Occupancy fraction above which proactive eviction runs.
    #[serde(default = "EngineConfig::default_fill_threshold")]
    pub fill_threshold: f64,

    /// Engine variant.
    #[serde(default)]
    pub variant: Variant,

    /// RNG seed for deterministic runs; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Emit per-access debug traces.
    #[serde(default)]
    pub debug: bool,
}

impl EngineConfig {
    /// Returns the default working-set size in bytes.
    fn default_data_set_size() -> u64 {
        defaults::DATA_SET_SIZE
    }

    /// Returns the default block size in bytes.
    fn default_block_size() -> u64 {
        defaults::BLOCK_SIZE
    }

    /// Returns the default bucket capacity (Z).
    fn default_blocks_per_bucket() -> usize {
        defaults::BLOCKS_PER_BUCKET
    }

    /// Returns the default tree utilization.
    fn default_utilization() -> f64 {
        defaults::UTILIZATION
    }

    /// Returns the default stash capacity in blocks.
    fn default_stash_capacity() -> usize {
        defaults::STASH_CAPACITY
    }

    /// Returns the default proactive-eviction threshold.
    fn default_fill_threshold() -> f64 {
        defaults::FILL_THRESHOLD
    }

    /// Backing-store size in bytes implied by the utilization target.
    pub fn oram_size(&self) -> u64 {
        (self.data_set_size as f64 / self.utilization).ceil() as u64
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_set_size: defaults::DATA_SET_SIZE,
            block_size: defaults::BLOCK_SIZE,
            blocks_per_bucket: defaults::BLOCKS_PER_BUCKET,
            utilization: defaults::UTILIZATION,
            stash_capacity: defaults::STASH_CAPACITY,
            fill_threshold: defaults::FILL_THRESHOLD,
            variant: Variant::default(),
            seed: None,
            debug: false,
        }
    }
}

/// Additive cycle-cost parameters for the latency model.
///
/// Latencies are accumulated, never measured: each event adds its configured
/// cost to the hit or ready latency totals in the statistics.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatencyConfig {
    /// Cost of serving a request directly from the stash.
    #[serde(default = "LatencyConfig::default_hit_directly")]
    pub hit_directly_cycles: u64,

    /// Per-slot cost of a path read through memory.
    #[serde(default = "LatencyConfig::default_hit_through_mem")]
    pub hit_through_mem_cycles: u64,

    /// Cost of one position-map remap.
    #[serde(default = "LatencyConfig::default_remap")]
    pub remap_cycles: u64,

    /// Per-slot cost of writing back to the tree.
    #[serde(default = "LatencyConfig::default_write_back")]
    pub write_back_cycles: u64,
}

impl LatencyConfig {
    /// Returns the default direct-hit cost.
    fn default_hit_directly() -> u64 {
        defaults::HIT_DIRECTLY_CYCLES
    }

    /// Returns the default through-memory per-slot cost.
    fn default_hit_through_mem() -> u64 {
        defaults::HIT_THROUGH_MEM_CYCLES
    }

    /// Returns the default remap cost.
    fn default_remap() -> u64 {
        defaults::REMAP_CYCLES
    }

    /// Returns the default write-back per-slot cost.
    fn default_write_back() -> u64 {
        defaults::WRITE_BACK_CYCLES
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            hit_directly_cycles: defaults::HIT_DIRECTLY_CYCLES,
            hit_through_mem_cycles: defaults::HIT_THROUGH_MEM_CYCLES,
            remap_cycles: defaults::REMAP_CYCLES,
            write_back_cycles: defaults::WRITE_BACK_CYCLES,
        }
    }
}

/// Per-level parameters for the recursive hierarchy.
///
/// The derivation consumes one entry per level; when it needs more levels
/// than entries are provided, the last entry repeats.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelParams {
    /// Block size in bytes at this level.
    #[serde(default = "EngineConfig::default_block_size")]
    pub block_size: u64,

    /// Blocks per bucket at this level.
    #[serde(default = "EngineConfig::default_blocks_per_bucket")]
    pub blocks_per_bucket: usize,

    /// Tree utilization at this level.
    #[serde(default = "EngineConfig::default_utilization")]
    pub utilization: f64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            block_size: defaults::BLOCK_SIZE,
            blocks_per_bucket: defaults::BLOCKS_PER_BUCKET,
            utilization: defaults::UTILIZATION,
        }
    }
}

/// Recursive hierarchy settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    /// On-chip budget in bytes for the residual position map.
    #[serde(default = "HierarchyConfig::default_on_chip_budget")]
    pub on_chip_budget: u64,

    /// Per-level geometry parameters; the last entry repeats as needed.
    #[serde(default = "HierarchyConfig::default_levels")]
    pub levels: Vec<LevelParams>,
}

impl HierarchyConfig {
    /// Returns the default on-chip position-map budget.
    fn default_on_chip_budget() -> u64 {
        defaults::ON_CHIP_BUDGET
    }

    /// Returns the default single-entry level parameter list.
    fn default_levels() -> Vec<LevelParams> {
        vec![LevelParams::default()]
    }

    /// Parameters for level `i`, repeating the last entry beyond the list.
    pub fn level_params(&self, i: usize) -> LevelParams {
        let last = self.levels.len().saturating_sub(1);
        self.levels
            .get(i.min(last))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            on_chip_budget: defaults::ON_CHIP_BUDGET,
            levels: Self::default_levels(),
        }
    }
}

/// Synthetic workload settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    /// Workload kind.
    #[serde(default)]
    pub kind: WorkloadKind,

    /// Number of requests to issue.
    #[serde(default = "WorkloadConfig::default_accesses")]
    pub accesses: u64,

    /// Read fraction for the uniform mix.
    #[serde(default = "WorkloadConfig::default_read_fraction")]
    pub read_fraction: f64,

    /// RNG seed for the request stream; `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl WorkloadConfig {
    /// Returns the default request count.
    fn default_accesses() -> u64 {
        defaults::ACCESSES
    }

    /// Returns the default read fraction.
    fn default_read_fraction() -> f64 {
        defaults::READ_FRACTION
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            kind: WorkloadKind::default(),
            accesses: defaults::ACCESSES,
            read_fraction: defaults::READ_FRACTION,
            seed: None,
        }
    }
}
