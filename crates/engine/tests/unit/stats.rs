//! Statistics snapshot unit tests.

use oramsim_core::common::AccessClass;
use oramsim_core::stats::{EngineStats, Split};

/// Splits accumulate per class and total across both.
#[test]
fn split_accumulates_per_class() {
    let mut split = Split::default();
    split.bump(AccessClass::Real);
    split.bump(AccessClass::Real);
    split.bump(AccessClass::Dummy);
    split.add(AccessClass::Dummy, 3);

    assert_eq!(split.real, 2);
    assert_eq!(split.dummy, 4);
    assert_eq!(split.total(), 6);
}

/// Average latencies round up and guard the zero-access case.
#[test]
fn average_latencies_round_up() {
    let mut stats = EngineStats::default();
    assert_eq!(stats.avg_hit_latency(), 0);

    stats.accesses = 3;
    stats.hit_latency = 10;
    stats.ready_latency = 9;
    assert_eq!(stats.avg_hit_latency(), 4);
    assert_eq!(stats.avg_ready_latency(), 3);
}

/// Merging sums the counters, keeps the maximum peak occupancy, and sums
/// the concurrent last occupancies.
#[test]
fn merged_combines_counters() {
    let mut a = EngineStats::default();
    a.accesses = 10;
    a.read_errors = 1;
    a.stash_peak_occupancy = 40;
    a.stash_last_occupancy = 7;
    a.path_reads.bump(AccessClass::Real);

    let mut b = EngineStats::default();
    b.accesses = 5;
    b.stash_peak_occupancy = 25;
    b.stash_last_occupancy = 3;
    b.path_reads.bump(AccessClass::Dummy);

    let merged = a.merged(&b);
    assert_eq!(merged.accesses, 15);
    assert_eq!(merged.read_errors, 1);
    assert_eq!(merged.stash_peak_occupancy, 40);
    assert_eq!(merged.stash_last_occupancy, 10);
    assert_eq!(merged.path_reads.total(), 2);
}

/// Reset clears everything back to the default snapshot.
#[test]
fn reset_clears_counters() {
    let mut stats = EngineStats::default();
    stats.accesses = 10;
    stats.hit_latency = 99;
    stats.reset();
    assert_eq!(stats.accesses, 0);
    assert_eq!(stats.hit_latency, 0);
}
