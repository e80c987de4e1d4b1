//! Simulation drivers: synthetic workloads and run loops.
//!
//! The engines consume one request at a time; this module supplies the
//! request streams and the loop that keeps the proactive eviction cadence
//! (drain before serving whenever occupancy has crossed the threshold).
//! The CLI and the integration tests both drive the engines through these
//! helpers.

/// Synthetic request generation and run loops.
pub mod workload;

pub use workload::{Request, RequestStream, RunSummary, run_engine, run_hierarchy};
