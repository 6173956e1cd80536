//! Traversal of a single batch.

use tracing::{debug_span, trace};

use super::batch::SourceBatch;
use super::buffers::ScratchBuffers;
use super::source_nodes::SourceNodes;
use super::strategy::ExecutionStrategy;
use crate::error::Result;
use crate::graph::RelationshipIterator;

/// Drives one [`SourceBatch`] through an [`ExecutionStrategy`].
#[derive(Debug, Clone)]
pub struct MsBfsRunner {
    batch: SourceBatch,
    node_count: usize,
    allow_start_node_traversal: bool,
}

impl MsBfsRunner {
    /// Creates a runner for `batch` over the id space `[0, node_count)`.
    ///
    /// Fails with [`MsBfsError::SourceOutOfBounds`](crate::MsBfsError::SourceOutOfBounds)
    /// if a source lies outside the id space.
    pub fn new(batch: SourceBatch, node_count: usize, allow_start_node_traversal: bool) -> Result<Self> {
        batch.check_bounds(node_count)?;
        Ok(Self::new_unchecked(batch, node_count, allow_start_node_traversal))
    }

    pub(crate) fn new_unchecked(
        batch: SourceBatch,
        node_count: usize,
        allow_start_node_traversal: bool,
    ) -> Self {
        Self {
            batch,
            node_count,
            allow_start_node_traversal,
        }
    }

    /// The batch this runner traverses.
    pub fn batch(&self) -> &SourceBatch {
        &self.batch
    }

    /// Clears `buffers`, seeds them with the batch and runs `strategy` until the
    /// frontier is exhausted. Returns the last depth at which anything was reported.
    ///
    /// # Panics
    ///
    /// Panics if `buffers` was sized for a different node count, or if the strategy
    /// needs a `seen_next` array that `buffers` lacks.
    pub fn run<R, N, P>(
        &self,
        relationships: &R,
        strategy: &ExecutionStrategy<N, P>,
        buffers: &mut ScratchBuffers,
    ) -> u32
    where
        R: RelationshipIterator,
        N: Fn(usize, u32, &mut SourceNodes<'_>) + Sync,
        P: Fn(usize, usize, u32, &mut SourceNodes<'_>) + Sync,
    {
        assert_eq!(
            buffers.node_count(),
            self.node_count,
            "scratch buffers were sized for a different graph"
        );
        if self.batch.is_empty() {
            return 0;
        }

        let _span = debug_span!("msbfs_batch", batch = %self.batch).entered();

        buffers.clear();
        for (bit, node) in self.batch.sources().enumerate() {
            let mask = 1u64 << bit;
            buffers.visit.or(node, mask);
            if !self.allow_start_node_traversal {
                buffers.seen.or(node, mask);
            }
        }

        let mut sources = SourceNodes::new(&self.batch);
        let last_depth = strategy.run(relationships, buffers, &mut sources);
        trace!(last_depth, "batch finished");
        last_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MsBfsError;
    use crate::graph::CsrGraph;
    use crate::msbfs::NoPredecessors;

    #[test]
    fn rejects_sources_outside_the_graph() {
        let batch = SourceBatch::range(2, 3).unwrap();
        assert!(matches!(
            MsBfsRunner::new(batch, 4, false),
            Err(MsBfsError::SourceOutOfBounds { node: 4, node_count: 4 })
        ));
    }

    #[test]
    fn reuses_buffers_between_batches() {
        let graph = CsrGraph::from_edges(5, &[(0, 1), (1, 2), (3, 4)], false);
        let strategy: ExecutionStrategy<_, NoPredecessors> = ExecutionStrategy::AggregatedNeighborProcessing {
            per_node: |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
        };
        let mut buffers = ScratchBuffers::new(5, false);

        let first = MsBfsRunner::new(SourceBatch::explicit(vec![0]).unwrap(), 5, false).unwrap();
        assert_eq!(first.run(&&graph, &strategy, &mut buffers), 2);

        let second = MsBfsRunner::new(SourceBatch::explicit(vec![3]).unwrap(), 5, false).unwrap();
        assert_eq!(second.run(&&graph, &strategy, &mut buffers), 1);
        assert_eq!(buffers.seen.get(2), 0);
    }

    #[test]
    #[should_panic(expected = "different graph")]
    fn buffer_size_must_match() {
        let graph = CsrGraph::from_edges(3, &[], false);
        let strategy: ExecutionStrategy<_, NoPredecessors> = ExecutionStrategy::AggregatedNeighborProcessing {
            per_node: |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
        };
        let runner = MsBfsRunner::new(SourceBatch::range(0, 1).unwrap(), 3, false).unwrap();
        runner.run(&&graph, &strategy, &mut ScratchBuffers::new(2, false));
    }
}
