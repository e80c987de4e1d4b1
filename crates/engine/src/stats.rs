//! Simulation statistics collection and reporting.
//!
//! This module tracks the accounting outputs of the simulator. It provides:
//! 1. **Access counts:** Total, real, and dummy accesses per engine.
//! 2. **Traffic:** Path reads/writes and per-slot real/empty block traffic,
//!    each split by real vs dummy access.
//! 3. **Stash:** Hit/miss counts and peak/last occupancy.
//! 4. **Latency:** Additive hit and ready latency totals with derived
//!    averages.
//! 5. **Allocation quality:** Adequate vs under-allocated best-fit path
//!    selections of the staged engine.
//!
//! Counters are exposed as one immutable snapshot value object per engine
//! rather than individual accessors; hierarchies merge the snapshots of
//! their levels.

use crate::common::AccessClass;

/// A counter split by access class (real request vs dummy eviction drive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Split {
    /// Events attributed to real accesses.
    pub real: u64,
    /// Events attributed to dummy accesses.
    pub dummy: u64,
}

impl Split {
    /// Adds one event under `class`.
    pub fn bump(&mut self, class: AccessClass) {
        self.add(class, 1);
    }

    /// Adds `n` events under `class`.
    pub fn add(&mut self, class: AccessClass, n: u64) {
        match class {
            AccessClass::Real => self.real += n,
            AccessClass::Dummy => self.dummy += n,
        }
    }

    /// Sum over both classes.
    pub fn total(&self) -> u64 {
        self.real + self.dummy
    }

    /// Component-wise sum of two splits.
    pub fn merged(self, other: Self) -> Self {
        Self {
            real: self.real + other.real,
            dummy: self.dummy + other.dummy,
        }
    }
}

/// Statistics snapshot for one engine.
///
/// All counters accumulate from initialization (or the last reset) and are
/// pure accounting outputs with no control semantics.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Accesses of any kind, including dummy accesses.
    pub accesses: u64,
    /// Accesses addressing a real block id.
    pub actual_accesses: u64,
    /// Dummy accesses (negative id or background eviction).
    pub dummy_accesses: u64,

    /// Accesses that had to go through the tree (stash misses).
    pub memory_accesses: Split,
    /// Full path reads.
    pub path_reads: Split,
    /// Full path writes (including batch kick-out passes).
    pub path_writes: Split,

    /// Occupied slots encountered while reading paths.
    pub real_block_reads: Split,
    /// Empty slots encountered while reading paths.
    pub empty_block_reads: Split,
    /// Real blocks written into tree slots.
    pub real_block_writes: Split,
    /// Empty sentinels written into tree slots.
    pub empty_block_writes: Split,

    /// Requests served from the stash/staging area.
    pub stash_hits: Split,
    /// Requests that missed the stash/staging area.
    pub stash_misses: Split,

    /// Accumulated cycles until the requested block is available.
    pub hit_latency: u64,
    /// Accumulated cycles until the engine is ready for the next request
    /// (remaps and write-backs).
    pub ready_latency: u64,

    /// Highest stash/staging occupancy observed after any access.
    pub stash_peak_occupancy: usize,
    /// Stash/staging occupancy after the most recent access.
    pub stash_last_occupancy: usize,

    /// Reads of a block id that was never written (reported, non-fatal).
    pub read_errors: u64,

    /// Best-fit path selections whose free space covered the need.
    pub adequate_allocations: u64,
    /// Best-fit path selections that under-allocated and retried.
    pub under_allocations: u64,
    /// Merge-and-kick-out passes run by the staged engine.
    pub merge_passes: u64,
}

impl EngineStats {
    /// Average hit latency per access, rounded up; 0 before any access.
    pub fn avg_hit_latency(&self) -> u64 {
        if self.accesses == 0 {
            0
        } else {
            self.hit_latency.div_ceil(self.accesses)
        }
    }

    /// Average ready latency per access, rounded up; 0 before any access.
    pub fn avg_ready_latency(&self) -> u64 {
        if self.accesses == 0 {
            0
        } else {
            self.ready_latency.div_ceil(self.accesses)
        }
    }

    /// Clears every counter back to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Component-wise sum of two snapshots.
    ///
    /// Occupancy metrics take the maximum (peak) and the sum (last), since
    /// per-level last occupancies are concurrent, not alternatives.
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            accesses: self.accesses + other.accesses,
            actual_accesses: self.actual_accesses + other.actual_accesses,
            dummy_accesses: self.dummy_accesses + other.dummy_accesses,
            memory_accesses: self.memory_accesses.merged(other.memory_accesses),
            path_reads: self.path_reads.merged(other.path_reads),
            path_writes: self.path_writes.merged(other.path_writes),
            real_block_reads: self.real_block_reads.merged(other.real_block_reads),
            empty_block_reads: self.empty_block_reads.merged(other.empty_block_reads),
            real_block_writes: self.real_block_writes.merged(other.real_block_writes),
            empty_block_writes: self.empty_block_writes.merged(other.empty_block_writes),
            stash_hits: self.stash_hits.merged(other.stash_hits),
            stash_misses: self.stash_misses.merged(other.stash_misses),
            hit_latency: self.hit_latency + other.hit_latency,
            ready_latency: self.ready_latency + other.ready_latency,
            stash_peak_occupancy: self.stash_peak_occupancy.max(other.stash_peak_occupancy),
            stash_last_occupancy: self.stash_last_occupancy + other.stash_last_occupancy,
            read_errors: self.read_errors + other.read_errors,
            adequate_allocations: self.adequate_allocations + other.adequate_allocations,
            under_allocations: self.under_allocations + other.under_allocations,
            merge_passes: self.merge_passes + other.merge_passes,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"traffic"`, `"stash"`,
/// `"latency"`. Pass an empty slice to `print_sections` to print all
/// sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "traffic", "stash", "latency"];

impl EngineStats {
    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`,
    /// `"traffic"`, `"stash"`, or `"latency"`. Pass an empty slice to print
    /// all sections (same as `print`).
    pub fn print_sections(&self, label: &str, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let accesses = if self.accesses == 0 { 1 } else { self.accesses };

        println!("\n==========================================================");
        println!("ORAM SIMULATION STATISTICS: {label}");
        println!("==========================================================");
        if want("summary") {
            println!("accesses                 {}", self.accesses);
            println!(
                "accesses.real            {} ({:.2}%)",
                self.actual_accesses,
                (self.actual_accesses as f64 / accesses as f64) * 100.0
            );
            println!(
                "accesses.dummy           {} ({:.2}%)",
                self.dummy_accesses,
                (self.dummy_accesses as f64 / accesses as f64) * 100.0
            );
            println!("memory_accesses          {}", self.memory_accesses.total());
            println!("read_errors              {}", self.read_errors);
            println!("----------------------------------------------------------");
        }
        if want("traffic") {
            println!("TREE TRAFFIC");
            println!(
                "  path.reads             {} (real {} / dummy {})",
                self.path_reads.total(),
                self.path_reads.real,
                self.path_reads.dummy
            );
            println!(
                "  path.writes            {} (real {} / dummy {})",
                self.path_writes.total(),
                self.path_writes.real,
                self.path_writes.dummy
            );
            println!(
                "  slots.read.blocks      {}",
                self.real_block_reads.total()
            );
            println!(
                "  slots.read.empty       {}",
                self.empty_block_reads.total()
            );
            println!(
                "  slots.written.blocks   {}",
                self.real_block_writes.total()
            );
            println!(
                "  slots.written.empty    {}",
                self.empty_block_writes.total()
            );
            if self.merge_passes > 0 {
                println!("  kickout.passes         {}", self.merge_passes);
                println!(
                    "  kickout.fit.adequate   {}",
                    self.adequate_allocations
                );
                println!("  kickout.fit.under      {}", self.under_allocations);
            }
            println!("----------------------------------------------------------");
        }
        if want("stash") {
            let lookups = self.stash_hits.total() + self.stash_misses.total();
            let hit_rate = if lookups > 0 {
                (self.stash_hits.total() as f64 / lookups as f64) * 100.0
            } else {
                0.0
            };
            println!("STASH");
            println!("  hits                   {}", self.stash_hits.total());
            println!("  misses                 {}", self.stash_misses.total());
            println!("  hit_rate               {hit_rate:.2}%");
            println!("  occupancy.peak         {}", self.stash_peak_occupancy);
            println!("  occupancy.last         {}", self.stash_last_occupancy);
            println!("----------------------------------------------------------");
        }
        if want("latency") {
            println!("LATENCY (additive cycle model)");
            println!("  hit.total              {}", self.hit_latency);
            println!("  hit.avg                {}", self.avg_hit_latency());
            println!("  ready.total            {}", self.ready_latency);
            println!("  ready.avg              {}", self.avg_ready_latency());
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(label, &[])`.
    pub fn print(&self, label: &str) {
        self.print_sections(label, &[]);
    }
}
