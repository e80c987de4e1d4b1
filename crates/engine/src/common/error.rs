//! Fatal configuration error definitions.
//!
//! This module defines the error taxonomy for configuration-time failures.
//! These represent programmer or deployment errors, not runtime conditions:
//! a simulation that hits one of them cannot produce meaningful results and
//! must not start. Runtime invariant violations (a full stash on a non-dummy
//! access) are asserted instead, and reported logical conditions (reading a
//! block that was never written) are counted in the statistics.

use thiserror::Error;

/// Errors detected while deriving an engine or hierarchy configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The ORAM backing store must strictly exceed the data set it holds;
    /// otherwise the tree cannot absorb the working set plus dummies.
    #[error("ORAM size {oram_size} B must exceed data set size {data_set_size} B")]
    OramTooSmall {
        /// Backing store size in bytes after applying utilization.
        oram_size: u64,
        /// Requested working-set size in bytes.
        data_set_size: u64,
    },

    /// The stash must have room for at least one full path of blocks.
    #[error("stash capacity {capacity} must exceed one path ({path_slots} slots)")]
    StashTooSmall {
        /// Configured stash capacity in blocks.
        capacity: usize,
        /// Blocks on one root-to-leaf path (`Z * level_count`).
        path_slots: usize,
    },

    /// Recursion is only meaningful when the data set cannot fit on chip.
    #[error("data set size {data_set_size} B must exceed the on-chip budget {budget} B")]
    BudgetNotExceeded {
        /// Requested working-set size in bytes.
        data_set_size: u64,
        /// On-chip position-map budget in bytes.
        budget: u64,
    },

    /// A numeric parameter was zero or otherwise outside its valid domain.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value, rendered for the message.
        value: String,
    },

    /// The derivation loop exhausted the level limit without fitting the
    /// position map into the on-chip budget.
    #[error("hierarchy depth limit {limit} reached before position map fit on chip")]
    HierarchyTooDeep {
        /// Maximum number of levels permitted.
        limit: usize,
    },
}
