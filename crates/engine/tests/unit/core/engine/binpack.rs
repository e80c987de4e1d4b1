//! Quantity map and best-fit selection unit tests.
//!
//! Uses a 3-level tree (7 buckets, 4 leaves, Z = 2, 14 slots) small enough
//! to enumerate by hand:
//!
//! ```text
//!            0
//!        1       2
//!      3   4   5   6     (leaves, ordinals 0..=3)
//! ```
//!
//! A leaf's path free count sums the empty slots of its three buckets.

use oramsim_core::core::engine::binpack::QuantityMap;
use oramsim_core::core::tree::{Geometry, TreeSlots};

fn small_tree() -> (Geometry, TreeSlots) {
    // 7 buckets * 2 blocks * 64 B = 896 B backing store.
    let geom = Geometry::derive(448, 896, 64, 2).expect("valid geometry");
    assert_eq!(geom.bucket_count, 7);
    assert_eq!(geom.leaf_count, 4);
    assert_eq!(geom.level_count, 3);
    let slots = TreeSlots::new(geom.block_count, geom.blocks_per_bucket);
    (geom, slots)
}

// ══════════════════════════════════════════════════════════
// 1. Quantity Map Refresh
// ══════════════════════════════════════════════════════════

/// An empty tree gives every leaf the full path capacity.
#[test]
fn empty_tree_has_full_paths() {
    let (geom, slots) = small_tree();
    let map = QuantityMap::rebuild(&geom, &slots);
    for ordinal in 0..4 {
        assert_eq!(map.free_on_path(ordinal), 6, "leaf ordinal {ordinal}");
    }
    assert_eq!(map.total_free(), 24);
}

/// Filling buckets subtracts from exactly the paths that cross them.
#[test]
fn fills_propagate_to_crossing_paths() {
    let (geom, mut slots) = small_tree();
    // Fill one slot of the root (on every path) and both slots of bucket 1
    // (on the paths of leaves 3 and 4 → ordinals 0 and 1).
    slots.set(slots.bucket_base(0), 100);
    slots.set(slots.bucket_base(1), 101);
    slots.set(slots.bucket_base(1) + 1, 102);

    let map = QuantityMap::rebuild(&geom, &slots);
    assert_eq!(map.free_on_path(0), 3); // root 1 + bucket1 0 + leaf3 2
    assert_eq!(map.free_on_path(1), 3);
    assert_eq!(map.free_on_path(2), 5); // root 1 + bucket2 2 + leaf5 2
    assert_eq!(map.free_on_path(3), 5);
}

// ══════════════════════════════════════════════════════════
// 2. Best-Fit Selection
// ══════════════════════════════════════════════════════════

/// An exact match wins immediately and counts as adequate.
#[test]
fn exact_fit_wins() {
    let (geom, mut slots) = small_tree();
    // Leaf ordinal 0's path: free 3; others stay at 6 or 5.
    slots.set(slots.bucket_base(3), 100);
    slots.set(slots.bucket_base(3) + 1, 101);
    slots.set(slots.bucket_base(1), 102);

    let map = QuantityMap::rebuild(&geom, &slots);
    assert_eq!(map.free_on_path(0), 3);
    let fit = map.best_fit(3);
    assert_eq!(fit.leaf_ordinal, 0);
    assert!(fit.adequate);
}

/// Without an exact match, the smallest free count above the need wins.
#[test]
fn smallest_adequate_path_wins() {
    let (geom, mut slots) = small_tree();
    // Ordinals: 0 → 4 free, others 6.
    slots.set(slots.bucket_base(3), 100);
    slots.set(slots.bucket_base(3) + 1, 101);

    let map = QuantityMap::rebuild(&geom, &slots);
    let fit = map.best_fit(3);
    assert_eq!(fit.leaf_ordinal, 0, "4 free beats 6 free for need 3");
    assert!(fit.adequate);
}

/// When no path is big enough, the largest available one is an
/// under-allocation.
#[test]
fn oversized_need_under_allocates() {
    let (geom, mut slots) = small_tree();
    // Fill the root completely: every path loses 2.
    slots.set(slots.bucket_base(0), 100);
    slots.set(slots.bucket_base(0) + 1, 101);

    let map = QuantityMap::rebuild(&geom, &slots);
    let fit = map.best_fit(10);
    assert!(!fit.adequate);
    assert_eq!(map.free_on_path(fit.leaf_ordinal), 4);
}
