//! Configuration unit tests.
//!
//! Verifies defaults, JSON deserialization with partial sections, level
//! parameter repetition, and the constructor-time fatal error taxonomy.

use oramsim_core::common::ConfigError;
use oramsim_core::config::{Config, EngineConfig, LatencyConfig, Variant, WorkloadKind};
use oramsim_core::{BaselineEngine, StagedEngine};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════
// 1. Defaults and Parsing
// ══════════════════════════════════════════════════════════

/// Defaults pick the staged variant and sequential workload.
#[test]
fn defaults_are_sane() {
    let config = Config::default();
    assert_eq!(config.engine.variant, Variant::Staged);
    assert_eq!(config.engine.blocks_per_bucket, 4);
    assert_eq!(config.workload.kind, WorkloadKind::Sequential);
    assert!(config.engine.fill_threshold > 0.0 && config.engine.fill_threshold <= 1.0);
}

/// Partial JSON fills the remaining fields with defaults.
#[test]
fn partial_json_uses_defaults() {
    let json = r#"{ "engine": { "variant": "baseline", "seed": 5 } }"#;
    let config: Config = serde_json::from_str(json).expect("valid JSON");
    assert_eq!(config.engine.variant, Variant::Baseline);
    assert_eq!(config.engine.seed, Some(5));
    assert_eq!(config.engine.block_size, 64);
    assert_eq!(config.latency.remap_cycles, LatencyConfig::default().remap_cycles);
}

/// The implied backing store divides the data set by the utilization.
#[test]
fn oram_size_applies_utilization() {
    let engine = EngineConfig {
        data_set_size: 1000,
        utilization: 0.5,
        ..EngineConfig::default()
    };
    assert_eq!(engine.oram_size(), 2000);
}

/// The last level-parameter entry repeats past the end of the list.
#[test]
fn level_params_repeat_last_entry() {
    let config = Config::default();
    let p0 = config.hierarchy.level_params(0);
    let p9 = config.hierarchy.level_params(9);
    assert_eq!(p0.block_size, p9.block_size);
    assert_eq!(p0.blocks_per_bucket, p9.blocks_per_bucket);
}

// ══════════════════════════════════════════════════════════
// 2. Fatal Configuration Errors
// ══════════════════════════════════════════════════════════

/// A stash without room for one full path is rejected.
#[test]
fn stash_smaller_than_one_path_is_rejected() {
    let cfg = EngineConfig {
        data_set_size: 64 * 1024,
        stash_capacity: 40, // path slots for this geometry = 40
        ..EngineConfig::default()
    };
    let err = BaselineEngine::new(&cfg, &LatencyConfig::default()).unwrap_err();
    assert_eq!(
        err,
        ConfigError::StashTooSmall {
            capacity: 40,
            path_slots: 40
        }
    );
}

/// Utilization must leave the backing store strictly larger than the data.
#[test]
fn utilization_out_of_range_is_rejected() {
    for utilization in [0.0, 1.0, 1.5, -0.5] {
        let cfg = EngineConfig {
            utilization,
            ..EngineConfig::default()
        };
        assert!(
            matches!(
                StagedEngine::new(&cfg, &LatencyConfig::default()),
                Err(ConfigError::InvalidParameter { name: "utilization", .. })
            ),
            "utilization {utilization} must be rejected"
        );
    }
}

/// A fill threshold outside (0, 1] is rejected.
#[test]
fn fill_threshold_out_of_range_is_rejected() {
    let cfg = EngineConfig {
        fill_threshold: 0.0,
        ..EngineConfig::default()
    };
    assert!(matches!(
        StagedEngine::new(&cfg, &LatencyConfig::default()),
        Err(ConfigError::InvalidParameter { name: "fill_threshold", .. })
    ));
}
