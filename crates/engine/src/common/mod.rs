//! Common types shared throughout the oblivious storage simulator.
//!
//! This module provides the fundamental vocabulary used by every component:
//! 1. **Block identity:** Logical block ids and the empty-slot sentinel.
//! 2. **Operations:** The four request kinds an engine accepts.
//! 3. **Access classes:** The real/dummy split used by all counters.
//! 4. **Error Handling:** Fatal configuration error taxonomy.

/// Fatal configuration error types.
pub mod error;

/// Block id, operation, and access-class definitions.
pub mod types;

pub use error::ConfigError;
pub use types::{AccessClass, BlockId, EMPTY_SLOT, Operation};
