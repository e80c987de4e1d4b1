//! Synthetic request generation and run loops.
//!
//! Two request streams are provided:
//! 1. **Sequential:** Writes to distinct ids in order, wrapping around the
//!    id space. Deterministic given the id space.
//! 2. **Uniform:** A warm-up pass writes every id once, then uniformly
//!    random ids with a configurable read fraction. The warm-up guarantees
//!    reads address blocks that exist.
//!
//! The run loops interleave background eviction with the request stream: a
//! real request is never issued into an engine past its fill threshold.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{BlockId, Operation};
use crate::config::{WorkloadConfig, WorkloadKind};
use crate::core::engine::OramEngine;
use crate::hierarchy::Hierarchy;

/// One request against an engine or hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Logical block id.
    pub id: BlockId,
    /// Operation to perform.
    pub op: Operation,
    /// Payload for writes.
    pub data: i64,
}

/// Iterator producing a bounded synthetic request stream.
#[derive(Debug)]
pub struct RequestStream {
    kind: WorkloadKind,
    total: u64,
    issued: u64,
    read_fraction: f64,
    id_space: usize,
    rng: StdRng,
}

impl RequestStream {
    /// Creates a stream of `cfg.accesses` requests over `id_space` ids.
    pub fn new(cfg: &WorkloadConfig, id_space: usize) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            kind: cfg.kind,
            total: cfg.accesses,
            issued: 0,
            read_fraction: cfg.read_fraction,
            id_space: id_space.max(1),
            rng,
        }
    }
}

impl Iterator for RequestStream {
    type Item = Request;

    fn next(&mut self) -> Option<Request> {
        if self.issued == self.total {
            return None;
        }
        let n = self.issued;
        self.issued += 1;

        let request = match self.kind {
            WorkloadKind::Sequential => Request {
                id: (n % self.id_space as u64) as BlockId,
                op: Operation::Write,
                data: n as i64,
            },
            WorkloadKind::Uniform => {
                if n < self.id_space as u64 {
                    // Warm-up: write every id once so later reads exist.
                    Request {
                        id: n as BlockId,
                        op: Operation::Write,
                        data: n as i64,
                    }
                } else {
                    let id = self.rng.gen_range(0..self.id_space) as BlockId;
                    let op = if self.rng.gen_bool(self.read_fraction) {
                        Operation::Read
                    } else {
                        Operation::Write
                    };
                    Request {
                        id,
                        op,
                        data: n as i64,
                    }
                }
            }
        };
        Some(request)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.issued) as usize;
        (remaining, Some(remaining))
    }
}

/// Aggregate result of one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Requests issued.
    pub requests: u64,
    /// Traffic generated by the requests themselves.
    pub traffic: u64,
    /// Traffic generated by proactive background eviction.
    pub background_traffic: u64,
}

/// Drives `engine` with the configured workload, draining proactively
/// whenever the fill threshold is crossed.
pub fn run_engine<E: OramEngine>(engine: &mut E, cfg: &WorkloadConfig) -> RunSummary {
    let stream = RequestStream::new(cfg, engine.geometry().real_block_count);
    let mut summary = RunSummary::default();
    for request in stream {
        if engine.stash_is_almost_full() {
            summary.background_traffic += engine.background_eviction();
        }
        summary.traffic += engine.access(request.id, request.op, request.data).traffic;
        summary.requests += 1;
    }
    summary
}

/// Drives a hierarchy with the configured workload, draining proactively
/// whenever any level's fill threshold is crossed.
pub fn run_hierarchy<E: OramEngine>(
    hierarchy: &mut Hierarchy<E>,
    cfg: &WorkloadConfig,
) -> RunSummary {
    let id_space = hierarchy.plan().levels[0].geometry.real_block_count;
    let stream = RequestStream::new(cfg, id_space);
    let mut summary = RunSummary::default();
    for request in stream {
        if hierarchy.any_stash_almost_full() {
            summary.background_traffic += hierarchy.background_eviction();
        }
        summary.traffic += hierarchy
            .access(request.id, request.op, request.data)
            .traffic;
        summary.requests += 1;
    }
    summary
}
