//! Position map unit tests.
//!
//! Verifies randomized initialization into the leaf range, remap commits,
//! and the reject-and-resample freshness guarantee.

use oramsim_core::core::position::PositionMap;
use oramsim_core::core::tree::Geometry;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn reference() -> Geometry {
    Geometry::derive(64 * 1024, 128 * 1024, 64, 4).expect("valid geometry")
}

/// Every id (including the dummy) starts with a leaf inside the leaf range.
#[test]
fn initialization_assigns_leaves_in_range() {
    let g = reference();
    let mut rng = StdRng::seed_from_u64(1);
    let map = PositionMap::new(&g, &mut rng);

    assert_eq!(map.len(), g.real_block_count + 1);
    for id in 0..map.len() {
        let leaf = map.leaf_of(id);
        assert!(
            (g.first_leaf()..=g.last_leaf()).contains(&leaf),
            "id {id} mapped outside the leaf range: {leaf}"
        );
    }
}

/// A remap commits exactly the requested leaf.
#[test]
fn remap_commits_new_leaf() {
    let g = reference();
    let mut rng = StdRng::seed_from_u64(2);
    let mut map = PositionMap::new(&g, &mut rng);

    map.remap(7, g.first_leaf());
    assert_eq!(map.leaf_of(7), g.first_leaf());
    map.remap(7, g.last_leaf());
    assert_eq!(map.leaf_of(7), g.last_leaf());
}

proptest! {
    /// A fresh sample never equals the current assignment, for any id and
    /// any RNG stream.
    #[test]
    fn sampled_leaf_is_always_fresh(seed in 0u64..1_000, id_pick in 0usize..10_000) {
        let g = reference();
        let mut rng = StdRng::seed_from_u64(seed);
        let map = PositionMap::new(&g, &mut rng);
        let id = id_pick % map.len();
        let before = map.leaf_of(id);
        let fresh = map.sample_fresh_leaf(id, &mut rng);
        prop_assert_ne!(fresh, before);
        prop_assert!((g.first_leaf()..=g.last_leaf()).contains(&fresh));
    }
}
