//! Workload stream and run-loop unit tests.

use oramsim_core::OramEngine;
use oramsim_core::common::Operation;
use oramsim_core::config::{WorkloadConfig, WorkloadKind};
use oramsim_core::sim::{RequestStream, run_engine};

use crate::common::staged_engine;

/// The sequential stream writes distinct ids in order, wrapping around.
#[test]
fn sequential_stream_writes_distinct_ids() {
    let cfg = WorkloadConfig {
        kind: WorkloadKind::Sequential,
        accesses: 6,
        seed: Some(1),
        ..WorkloadConfig::default()
    };
    let requests: Vec<_> = RequestStream::new(&cfg, 4).collect();

    assert_eq!(requests.len(), 6);
    let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 0, 1]);
    assert!(requests.iter().all(|r| r.op == Operation::Write));
}

/// The uniform stream warms every id with a write before mixing in reads,
/// and the mixed phase stays inside the id space.
#[test]
fn uniform_stream_warms_up_before_mixing() {
    let cfg = WorkloadConfig {
        kind: WorkloadKind::Uniform,
        accesses: 64,
        read_fraction: 0.5,
        seed: Some(2),
    };
    let requests: Vec<_> = RequestStream::new(&cfg, 16).collect();

    for (n, request) in requests.iter().take(16).enumerate() {
        assert_eq!(request.id, n as i64);
        assert_eq!(request.op, Operation::Write);
    }
    for request in &requests[16..] {
        assert!((0..16).contains(&request.id));
    }
    assert!(
        requests[16..].iter().any(|r| r.op == Operation::Read),
        "the mixed phase must contain reads"
    );
}

/// A seeded stream is reproducible.
#[test]
fn seeded_streams_are_deterministic() {
    let cfg = WorkloadConfig {
        kind: WorkloadKind::Uniform,
        accesses: 100,
        read_fraction: 0.3,
        seed: Some(9),
    };
    let a: Vec<_> = RequestStream::new(&cfg, 32).collect();
    let b: Vec<_> = RequestStream::new(&cfg, 32).collect();
    assert_eq!(a, b);
}

/// The run loop issues every request, never reads a nonexistent block
/// (warm-up first), and keeps the stash below capacity throughout.
#[test]
fn run_loop_keeps_cadence() {
    let mut engine = staged_engine();
    let cfg = WorkloadConfig {
        kind: WorkloadKind::Uniform,
        accesses: 2_000,
        read_fraction: 0.5,
        seed: Some(3),
    };
    let summary = run_engine(&mut engine, &cfg);

    assert_eq!(summary.requests, 2_000);
    let stats = engine.stats();
    assert_eq!(stats.read_errors, 0, "warm-up precedes every read");
    assert!(stats.stash_peak_occupancy <= 256);
    assert_eq!(stats.accesses, 2_000 + stats.dummy_accesses);
}
