//! Staging area unit tests.
//!
//! Verifies the temporal/candidate split, promotion between the areas,
//! combined occupancy accounting, and the temporal-almost-empty predicate.
//!
//! Test staging: capacity 64, path slots 8, threshold 0.7 → usable 56,
//! almost-full at 39.2 blocks.

use oramsim_core::core::stash::StagingArea;

fn test_staging() -> StagingArea {
    StagingArea::new(64, 8, 0.7)
}

// ══════════════════════════════════════════════════════════
// 1. Area Split
// ══════════════════════════════════════════════════════════

/// Temporal and candidate populations are disjoint and sum into `len`.
#[test]
fn areas_are_disjoint_and_summed() {
    let mut staging = test_staging();
    staging.put_temporal(1);
    staging.put_temporal(2);
    let _ = staging.promote(3);

    assert!(staging.temporal_contains(1));
    assert!(staging.candidate_contains(3));
    assert!(!staging.candidate_contains(1));
    assert_eq!(staging.temporal_len(), 2);
    assert_eq!(staging.candidate_len(), 1);
    assert_eq!(staging.len(), 3);
    assert!(staging.contains(1));
    assert!(staging.contains(3));
    assert!(!staging.contains(9));
}

/// A temporal block that gets requested moves into the candidate area.
#[test]
fn temporal_hit_promotes_to_candidate() {
    let mut staging = test_staging();
    staging.put_temporal(5);

    staging.remove_temporal(5);
    let freq = staging.promote(5);

    assert_eq!(freq, 1);
    assert!(!staging.temporal_contains(5));
    assert!(staging.candidate_contains(5));
    assert_eq!(staging.len(), 1);
}

/// Candidate frequency rises on every promotion.
#[test]
fn candidate_promotions_accumulate_frequency() {
    let mut staging = test_staging();
    assert_eq!(staging.promote(5), 1);
    assert_eq!(staging.promote(5), 2);
    assert_eq!(staging.promote(5), 3);
    assert_eq!(staging.candidate().frequency(5), Some(3));
}

// ══════════════════════════════════════════════════════════
// 2. Occupancy
// ══════════════════════════════════════════════════════════

/// The combined population drives the capacity predicates.
#[test]
fn combined_population_drives_thresholds() {
    let mut staging = test_staging();
    for id in 0..20 {
        staging.put_temporal(id);
    }
    for id in 20..39 {
        let _ = staging.promote(id);
    }
    // 39 < 0.7 * 56 = 39.2 → below threshold.
    assert!(!staging.is_almost_full());
    let _ = staging.promote(39);
    assert!(staging.is_almost_full());
    assert!(!staging.is_full(0));

    for id in 40..48 {
        staging.put_temporal(id);
    }
    // 48 + 0 + 8 >= 64 → full.
    assert!(staging.is_full(0));
}

/// The temporal area counts as almost empty at one path of blocks.
#[test]
fn temporal_almost_empty_at_one_path() {
    let mut staging = test_staging();
    for id in 0..8 {
        staging.put_temporal(id);
    }
    assert!(staging.temporal_almost_empty());
    staging.put_temporal(8);
    assert!(!staging.temporal_almost_empty());
}

/// Peak/last occupancy metrics sample the combined population.
#[test]
fn occupancy_metrics_sample_combined_population() {
    let mut staging = test_staging();
    staging.put_temporal(1);
    let _ = staging.promote(2);
    staging.record_occupancy();
    assert_eq!(staging.occupancy().peak(), 2);

    staging.remove_temporal(1);
    staging.record_occupancy();
    assert_eq!(staging.occupancy().peak(), 2);
    assert_eq!(staging.occupancy().last(), 1);
}
