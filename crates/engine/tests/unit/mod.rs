//! # Unit Tests
//!
//! Fine-grained tests for the simulator components, mirroring the source
//! tree layout.

/// Configuration parsing, defaults, and validation.
pub mod config;



/// Workload streams and run loops.
pub mod sim;

/// Statistics snapshot arithmetic.
pub mod stats;
