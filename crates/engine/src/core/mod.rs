//! Engine core: the components a single oblivious storage engine is built
//! from.
//!
//! This module organizes the leaf components of the simulator:
//! 1. **Tree:** Implicit complete-binary-tree geometry and slot storage.
//! 2. **Position map:** Per-block leaf assignments with randomized remap.
//! 3. **Stash:** Off-tree holding structures for both engine variants.
//! 4. **Engines:** The access state machines and eviction subsystems.

/// Path engines (baseline and staged) and their eviction machinery.
pub mod engine;

/// Position map: block id to assigned leaf.
pub mod position;

/// Stash and staging structures.
pub mod stash;

/// Bucket-tree geometry and slot storage.
pub mod tree;
