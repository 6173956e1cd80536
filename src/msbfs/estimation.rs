//! Memory footprint of a traversal run.

use core::mem;

use serde::Serialize;

use super::buffers::ScratchBuffers;

/// Bytes a traversal run allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryEstimate {
    /// Scratch buffers of one worker.
    pub per_thread: usize,
    /// The explicit source list.
    pub sources: usize,
    /// Everything, for all workers.
    pub total: usize,
}

/// Estimates the memory of a run over `node_count` nodes with `concurrency`
/// workers. `source_count` is the length of an explicit source list, if any.
pub fn memory_estimation(
    node_count: usize,
    concurrency: usize,
    with_predecessor: bool,
    source_count: Option<usize>,
) -> MemoryEstimate {
    let per_thread = ScratchBuffers::memory_estimation(node_count, with_predecessor);
    let sources = source_count.map_or(0, |count| count.saturating_mul(mem::size_of::<usize>()));
    MemoryEstimate {
        per_thread,
        sources,
        total: per_thread
            .saturating_mul(concurrency.max(1))
            .saturating_add(sources),
    }
}
