//! Bucket-tree geometry unit tests.
//!
//! Verifies the geometry derivation chain, the non-uniform parent rule, the
//! path-length invariant, and the slot storage. The derivation rounds the
//! backing store up to a complete tree, so most cases pin exact counts.

use oramsim_core::common::{ConfigError, EMPTY_SLOT};
use oramsim_core::core::tree::{Geometry, TreeSlots};
use proptest::prelude::*;
use rstest::rstest;

/// The reference geometry used across the suite: 1024 real blocks at
/// utilization 0.5.
fn reference() -> Geometry {
    Geometry::derive(64 * 1024, 128 * 1024, 64, 4).expect("valid geometry")
}

// ══════════════════════════════════════════════════════════
// 1. Derivation
// ══════════════════════════════════════════════════════════

/// 128 KiB of 64 B blocks in buckets of 4 → 512 buckets requested →
/// 10 levels → 1023 buckets after rounding to a complete tree.
#[test]
fn derivation_rounds_to_complete_tree() {
    let g = reference();
    assert_eq!(g.level_count, 10);
    assert_eq!(g.bucket_count, 1023);
    assert_eq!(g.block_count, 1023 * 4);
    assert_eq!(g.leaf_count, 512);
    assert_eq!(g.real_block_count, 1024);
    assert_eq!(g.oram_size, 1023 * 4 * 64);
}

/// A backing store of exactly `2^L - 1` buckets is preserved as-is.
#[rstest]
#[case(1, 1)]
#[case(3, 2)]
#[case(7, 3)]
#[case(1023, 10)]
fn derivation_exact_trees(#[case] buckets: usize, #[case] levels: usize) {
    let oram = (buckets * 4 * 64) as u64;
    let g = Geometry::derive(oram / 4, oram, 64, 4).expect("valid geometry");
    assert_eq!(g.bucket_count, buckets);
    assert_eq!(g.level_count, levels);
}

/// The backing store must strictly exceed the data set.
#[test]
fn derivation_rejects_undersized_oram() {
    let err = Geometry::derive(4096, 4096, 64, 4).unwrap_err();
    assert_eq!(
        err,
        ConfigError::OramTooSmall {
            oram_size: 4096,
            data_set_size: 4096
        }
    );
}

/// Zero-valued parameters are rejected.
#[test]
fn derivation_rejects_zero_parameters() {
    assert!(matches!(
        Geometry::derive(1024, 2048, 0, 4),
        Err(ConfigError::InvalidParameter { .. })
    ));
    assert!(matches!(
        Geometry::derive(1024, 2048, 64, 0),
        Err(ConfigError::InvalidParameter { .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 2. Parent Rule
// ══════════════════════════════════════════════════════════

/// Bucket 1's parent computation lands on the root slot.
#[test]
fn parent_of_bucket_one_is_root() {
    assert_eq!(Geometry::parent(1), 0);
}

/// The general rule is `ceil((b - 2) / 2)`.
#[rstest]
#[case(2, 0)]
#[case(3, 1)]
#[case(4, 1)]
#[case(5, 2)]
#[case(6, 2)]
#[case(7, 3)]
#[case(1022, 510)]
fn parent_general_rule(#[case] bucket: usize, #[case] parent: usize) {
    assert_eq!(Geometry::parent(bucket), parent);
}

// ══════════════════════════════════════════════════════════
// 3. Path-Length Invariant
// ══════════════════════════════════════════════════════════

/// Every leaf's walk visits exactly `level_count` buckets and ends at the
/// root.
#[test]
fn every_path_has_level_count_buckets_ending_at_root() {
    let g = reference();
    for leaf in g.first_leaf()..=g.last_leaf() {
        let path: Vec<usize> = g.path(leaf).collect();
        assert_eq!(path.len(), g.level_count, "leaf {leaf}");
        assert_eq!(path[0], leaf);
        assert_eq!(*path.last().unwrap(), 0);
        // Strictly ascending toward the root means strictly decreasing
        // indices after the first step.
        for pair in path.windows(2) {
            assert!(pair[1] < pair[0], "walk must move toward the root");
        }
    }
}

proptest! {
    /// Path length holds across randomly sized complete trees.
    #[test]
    fn path_length_invariant_random_geometry(levels in 1usize..12, leaf_pick in 0usize..10_000) {
        let buckets = (1usize << levels) - 1;
        let oram = (buckets * 4 * 64) as u64;
        let g = Geometry::derive(oram / 4, oram, 64, 4).expect("valid geometry");
        prop_assert_eq!(g.level_count, levels);
        let leaf = g.first_leaf() + leaf_pick % g.leaf_count;
        let path: Vec<usize> = g.path(leaf).collect();
        prop_assert_eq!(path.len(), levels);
        prop_assert_eq!(*path.last().unwrap(), 0);
    }
}

// ══════════════════════════════════════════════════════════
// 4. Slot Storage
// ══════════════════════════════════════════════════════════

/// Slots start empty and read back what was written.
#[test]
fn slots_round_trip() {
    let g = reference();
    let mut slots = TreeSlots::new(g.block_count, g.blocks_per_bucket);
    assert_eq!(slots.occupied(), 0);
    assert_eq!(slots.get(17), EMPTY_SLOT);

    slots.set(17, 99);
    assert_eq!(slots.get(17), 99);
    assert!(slots.contains(99));
    assert_eq!(slots.occupied(), 1);

    slots.clear(17);
    assert_eq!(slots.get(17), EMPTY_SLOT);
    assert_eq!(slots.occupied(), 0);
}

/// Per-bucket empty counts track writes.
#[test]
fn empty_in_bucket_counts() {
    let g = reference();
    let mut slots = TreeSlots::new(g.block_count, g.blocks_per_bucket);
    let base = slots.bucket_base(5);
    assert_eq!(slots.empty_in_bucket(5), 4);
    slots.set(base, 1);
    slots.set(base + 2, 2);
    assert_eq!(slots.empty_in_bucket(5), 2);
}
