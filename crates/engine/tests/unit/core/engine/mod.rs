//! Unit tests for the path engines.


/// Quantity map and best-fit path selection.
pub mod binpack;
