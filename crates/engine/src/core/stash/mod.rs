//! Stash and staging structures: off-tree holding areas for blocks awaiting
//! re-placement.
//!
//! Two structures back the two engine variants:
//! 1. **Baseline stash:** An ordered collection scanned linearly, drained
//!    against every path write.
//! 2. **Staging area:** A transient temporal map for blocks pulled off a
//!    path plus a frequency-bucketed candidate structure that tracks
//!    repeatedly touched blocks separately from one-shot ones.
//!
//! Both share the same capacity model: the usable limit reserves room for
//! one full path (`Z * level_count` slots) below the configured capacity,
//! and a configurable fill threshold marks the proactive-eviction point.

/// Baseline ordered stash.
pub mod baseline;

/// O(1) LFU frequency buckets.
pub mod freq;

/// Temporal/candidate staging area for the staged engine.
pub mod staging;

pub use baseline::Stash;
pub use freq::FrequencyBuckets;
pub use staging::StagingArea;

/// Occupancy bookkeeping shared by both stash variants.
///
/// Tracks the capacity model (usable limit below the configured capacity)
/// and the peak/last occupancy metrics sampled after every access.
#[derive(Debug, Clone)]
pub struct OccupancyModel {
    capacity: usize,
    path_slots: usize,
    fill_threshold: f64,
    peak: usize,
    last: usize,
}

impl OccupancyModel {
    /// Creates a model for `capacity` blocks with `path_slots` reserved.
    pub fn new(capacity: usize, path_slots: usize, fill_threshold: f64) -> Self {
        Self {
            capacity,
            path_slots,
            fill_threshold,
            peak: 0,
            last: 0,
        }
    }

    /// Whether `len` leaves less than `margin` blocks of usable headroom.
    ///
    /// The usable limit is the capacity minus one full path of slots, so a
    /// path read can never overflow a non-full stash.
    pub fn is_full(&self, len: usize, margin: usize) -> bool {
        len + margin + self.path_slots >= self.capacity
    }

    /// Whether `len` has crossed the proactive-eviction threshold.
    pub fn is_almost_full(&self, len: usize) -> bool {
        let usable = (self.capacity - self.path_slots) as f64;
        len as f64 >= self.fill_threshold * usable
    }

    /// Records `len` as the latest occupancy sample.
    pub fn record(&mut self, len: usize) {
        self.last = len;
        self.peak = self.peak.max(len);
    }

    /// Highest occupancy observed so far.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Occupancy at the last sample.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Configured capacity in blocks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
