//! Per-worker scratch state of a traversal.

use crate::collections::PagedBitmaskArray;

/// The per-node bitmask arrays one worker reuses for every batch it runs.
#[derive(Debug)]
pub struct ScratchBuffers {
    pub(crate) visit: PagedBitmaskArray,
    pub(crate) visit_next: PagedBitmaskArray,
    pub(crate) seen: PagedBitmaskArray,
    pub(crate) seen_next: Option<PagedBitmaskArray>,
}

impl ScratchBuffers {
    /// Allocates zeroed buffers for `node_count` nodes; `with_seen_next` adds the
    /// staging array predecessor processing needs.
    pub fn new(node_count: usize, with_seen_next: bool) -> Self {
        Self {
            visit: PagedBitmaskArray::new(node_count),
            visit_next: PagedBitmaskArray::new(node_count),
            seen: PagedBitmaskArray::new(node_count),
            seen_next: with_seen_next.then(|| PagedBitmaskArray::new(node_count)),
        }
    }

    /// Number of nodes the buffers cover.
    pub fn node_count(&self) -> usize {
        self.visit.len()
    }

    /// Returns `true` if the staging array for predecessor processing is present.
    pub fn has_seen_next(&self) -> bool {
        self.seen_next.is_some()
    }

    /// Zeroes every array without releasing memory.
    pub fn clear(&mut self) {
        self.visit.fill(0);
        self.visit_next.fill(0);
        self.seen.fill(0);
        if let Some(seen_next) = &mut self.seen_next {
            seen_next.fill(0);
        }
    }

    /// Bytes allocated for `node_count` nodes.
    pub fn memory_estimation(node_count: usize, with_seen_next: bool) -> usize {
        let arrays = if with_seen_next { 4 } else { 3 };
        PagedBitmaskArray::memory_estimation(node_count).saturating_mul(arrays)
    }
}
