//! Oblivious RAM storage engine simulator library.
//!
//! This crate simulates tree-indexed oblivious storage engines whose physical
//! access pattern is independent of the logical blocks requested. It provides:
//! 1. **Core:** Bucket-tree geometry, position map, stash/staging structures,
//!    and the baseline (Path ORAM) and staged (PCD-ORAM) path engines.
//! 2. **Eviction:** Intersection-based path eviction and frequency-aware,
//!    bin-packed batch eviction with per-path free-slot accounting.
//! 3. **Hierarchy:** Recursive composition that stores each level's position
//!    map inside a smaller engine until the residue fits an on-chip budget.
//! 4. **Simulation:** Configuration, synthetic workloads, latency accounting,
//!    and statistics collection.

/// Common types and constants (block ids, operations, access classes).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Engine core (tree, position map, stash/staging, path engines).
pub mod core;
/// Hierarchical composition of engines (recursive position maps).
pub mod hierarchy;
/// Synthetic workload generation and simulation drivers.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Classical Path ORAM engine; always writes back the path it read.
pub use crate::core::engine::BaselineEngine;
/// Engine access seam; implemented by both engine variants.
pub use crate::core::engine::OramEngine;
/// Enhanced engine; threshold-gated eviction with bin-packed batch kick-out.
pub use crate::core::engine::StagedEngine;
/// Recursive composition of engines; construct with `Hierarchy::new`.
pub use crate::hierarchy::Hierarchy;
