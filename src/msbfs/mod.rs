//! Multi-source breadth-first search.
//!
//! Up to [`OMEGA`] sources are traversed at once: every node carries a `u64`
//! per state array, one bit per source, so sources arriving at the same node at
//! the same depth share the work of expanding it. More sources are split into
//! independent batches of [`OMEGA`] which run on a [`WorkerPool`].
//!
//! ```
//! use msbfs::{CsrGraph, MsBfs, SourceNodes};
//! use std::sync::Mutex;
//!
//! let graph = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], false);
//! let reached = Mutex::new(Vec::new());
//! let bfs = MsBfs::aggregated_neighbor_processing(
//!     graph.node_count(),
//!     &graph,
//!     |node: usize, depth: u32, sources: &mut SourceNodes<'_>| {
//!         reached.lock().unwrap().push((node, depth, sources.collect::<Vec<_>>()));
//!     },
//!     Some(vec![0]),
//! )
//! .unwrap();
//! bfs.run(1, None).unwrap();
//! assert_eq!(
//!     reached.into_inner().unwrap(),
//!     vec![(1, 1, vec![0]), (2, 2, vec![0]), (3, 3, vec![0])]
//! );
//! ```

pub mod batch;
pub mod buffers;
pub mod estimation;
pub mod runner;
pub mod source_nodes;
pub mod strategy;

use core::fmt;

use tracing::debug;

pub use batch::SourceBatch;
pub use buffers::ScratchBuffers;
pub use estimation::{memory_estimation, MemoryEstimate};
pub use runner::MsBfsRunner;
pub use source_nodes::SourceNodes;
pub use strategy::{ExecutionStrategy, NoPredecessors};

use crate::concurrency::{can_run_in_parallel, run_with_concurrency, WorkerPool};
use crate::config::MsBfsConfig;
use crate::error::{MsBfsError, Result};
use crate::graph::RelationshipIterator;
use crate::partition::{thread_count, RangePartitions};

/// Number of sources traversed together in one batch: the bit width of the per-node masks.
pub const OMEGA: usize = 64;

/// A configured multi-source BFS over any number of sources.
pub struct MsBfs<R, N, P = NoPredecessors> {
    node_count: usize,
    relationships: R,
    strategy: ExecutionStrategy<N, P>,
    sources: Option<Vec<usize>>,
    allow_start_node_traversal: bool,
}

impl<R, N> MsBfs<R, N, NoPredecessors>
where
    R: RelationshipIterator,
    N: Fn(usize, u32, &mut SourceNodes<'_>) + Sync,
{
    /// Aggregated neighbor processing: `per_node(node, depth, sources)` is called
    /// once per newly reached node and depth with every source that reached it.
    /// Sources are not reported at depth 0.
    ///
    /// `sources: None` (or an empty list) traverses from every node.
    pub fn aggregated_neighbor_processing(
        node_count: usize,
        relationships: R,
        per_node: N,
        sources: Option<Vec<usize>>,
    ) -> Result<Self> {
        Self::new(
            node_count,
            relationships,
            ExecutionStrategy::AggregatedNeighborProcessing { per_node },
            sources,
        )
    }
}

impl<R, N, P> MsBfs<R, N, P>
where
    R: RelationshipIterator,
    N: Fn(usize, u32, &mut SourceNodes<'_>) + Sync,
    P: Fn(usize, usize, u32, &mut SourceNodes<'_>) + Sync,
{
    /// Predecessor processing: `per_node(node, depth, sources)` is called for every
    /// frontier node, sources included at depth 0, and
    /// `per_neighbor(target, predecessor, depth, sources)` for every relationship
    /// through which sources first reach `target`.
    ///
    /// `sources: None` (or an empty list) traverses from every node.
    pub fn predecessor_processing(
        node_count: usize,
        relationships: R,
        per_node: N,
        per_neighbor: P,
        sources: Option<Vec<usize>>,
    ) -> Result<Self> {
        Self::new(
            node_count,
            relationships,
            ExecutionStrategy::Predecessor {
                per_node,
                per_neighbor,
            },
            sources,
        )
    }

    /// Creates a traversal with an explicit strategy.
    ///
    /// Explicit sources are sorted; they must lie within `[0, node_count)`. An empty
    /// source list traverses from every node, like `None`.
    pub fn new(
        node_count: usize,
        relationships: R,
        strategy: ExecutionStrategy<N, P>,
        sources: Option<Vec<usize>>,
    ) -> Result<Self> {
        let sources = match sources {
            Some(mut sources) if !sources.is_empty() => {
                sources.sort_unstable();
                if let Some(&node) = sources.last().filter(|&&node| node >= node_count) {
                    return Err(MsBfsError::SourceOutOfBounds { node, node_count });
                }
                Some(sources)
            }
            _ => None,
        };

        Ok(Self {
            node_count,
            relationships,
            strategy,
            sources,
            allow_start_node_traversal: false,
        })
    }

    /// Runs all batches with at most `concurrency` of them at once on `executor`.
    ///
    /// Without an executor, with a shut-down one, or with `concurrency <= 1` the
    /// batches run one after another on the calling thread.
    ///
    /// # Panics
    ///
    /// Re-raises panics from the callbacks or the relationship iterator.
    pub fn run(&self, concurrency: usize, executor: Option<&WorkerPool>) -> Result<()> {
        self.run_batches(concurrency, executor, self.allow_start_node_traversal)
    }

    /// Like [`run`](Self::run) with concurrency and start-node traversal taken from `config`.
    pub fn run_with_config(&self, config: &MsBfsConfig, executor: Option<&WorkerPool>) -> Result<()> {
        config.validate()?;
        self.run_batches(config.concurrency, executor, config.allow_start_node_traversal)
    }

    /// Runs all sources as one batch on the calling thread and returns the last
    /// depth at which anything was reported.
    ///
    /// Fails with [`MsBfsError::TooManySources`] if there are more than [`OMEGA`] sources.
    pub fn run_single_batch(&self) -> Result<u32> {
        let count = self.source_count();
        if count > OMEGA {
            return Err(MsBfsError::TooManySources { count, max: OMEGA });
        }
        if count == 0 {
            return Ok(0);
        }

        let batch = self.batch_for(0, count);
        let runner = MsBfsRunner::new_unchecked(batch, self.node_count, self.allow_start_node_traversal);
        let mut buffers = ScratchBuffers::new(self.node_count, self.strategy.requires_seen_next());
        Ok(runner.run(&self.relationships, &self.strategy, &mut buffers))
    }

    fn run_batches(
        &self,
        concurrency: usize,
        executor: Option<&WorkerPool>,
        allow_start_node_traversal: bool,
    ) -> Result<()> {
        let batch_count = self.batch_count()?;
        if batch_count == 0 {
            debug!(node_count = self.node_count, "empty graph, nothing to traverse");
            return Ok(());
        }

        let parallel = concurrency > 1 && can_run_in_parallel(executor);
        if executor.is_some() && !parallel {
            debug!(concurrency, "executor unavailable, running batches sequentially");
        }
        debug!(
            node_count = self.node_count,
            sources = self.source_count(),
            batches = batch_count,
            concurrency,
            parallel,
            "starting multi-source BFS"
        );

        let node_count = self.node_count;
        let strategy = &self.strategy;
        let with_seen_next = strategy.requires_seen_next();
        let tasks = RangePartitions::new(self.source_count(), OMEGA)?.map(|partition| {
            let batch = self.batch_for(partition.start_node(), partition.node_count());
            let runner = MsBfsRunner::new_unchecked(batch, node_count, allow_start_node_traversal);
            (runner, self.relationships.concurrent_copy())
        });

        run_with_concurrency(
            executor,
            concurrency,
            tasks,
            || ScratchBuffers::new(node_count, with_seen_next),
            |buffers, (runner, relationships): (MsBfsRunner, R)| {
                runner.run(&relationships, strategy, buffers);
            },
        )?;

        debug!(batches = batch_count, "multi-source BFS finished");
        Ok(())
    }
}

impl<R, N, P> MsBfs<R, N, P> {
    /// Lets sources be rediscovered by their own traversal (through a cycle).
    #[must_use]
    pub fn allow_start_node_traversal(mut self, allow: bool) -> Self {
        self.allow_start_node_traversal = allow;
        self
    }

    /// Size of the node id space.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of sources to traverse from.
    pub fn source_count(&self) -> usize {
        self.sources.as_ref().map_or(self.node_count, Vec::len)
    }

    /// Number of batches the sources are split into.
    ///
    /// Fails with [`MsBfsError::CapacityExceeded`] if the count does not fit a `u32`.
    pub fn batch_count(&self) -> Result<usize> {
        let sources = self.source_count();
        if sources == 0 {
            return Ok(0);
        }
        let batches = thread_count(OMEGA, sources)?;
        if u32::try_from(batches).is_err() {
            return Err(MsBfsError::CapacityExceeded {
                sources,
                batches: batches as u64,
            });
        }
        Ok(batches)
    }

    fn batch_for(&self, start: usize, len: usize) -> SourceBatch {
        match &self.sources {
            Some(sources) => SourceBatch::Explicit(sources[start..start + len].to_vec()),
            None => SourceBatch::Range { offset: start, len },
        }
    }
}

impl<R, N, P> fmt::Display for MsBfs<R, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sources {
            Some(sources) => batch::write_sources(f, sources),
            None => batch::write_range(f, 0, self.node_count),
        }
    }
}

impl<R, N, P> fmt::Debug for MsBfs<R, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsBfs")
            .field("node_count", &self.node_count)
            .field("sources", &self.source_count())
            .field("allow_start_node_traversal", &self.allow_start_node_traversal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::graph::CsrGraph;

    type Reports = Mutex<Vec<(usize, u32, Vec<usize>)>>;

    fn chain() -> CsrGraph {
        CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], false)
    }

    fn sorted(reports: Reports) -> Vec<(usize, u32, Vec<usize>)> {
        let mut reports = reports.into_inner().unwrap();
        reports.sort();
        reports
    }

    #[test]
    fn chain_with_two_sources() {
        let graph = chain();
        let reports = Reports::default();
        let bfs = MsBfs::aggregated_neighbor_processing(
            4,
            &graph,
            |node: usize, depth: u32, sources: &mut SourceNodes<'_>| {
                reports.lock().unwrap().push((node, depth, sources.collect()));
            },
            Some(vec![2, 0]),
        )
        .unwrap();
        bfs.run(1, None).unwrap();

        assert_eq!(
            sorted(reports),
            vec![(1, 1, vec![0]), (2, 2, vec![0]), (3, 1, vec![2]), (3, 3, vec![0])]
        );
    }

    #[test]
    fn single_batch_returns_last_depth() {
        let graph = chain();
        let bfs = MsBfs::aggregated_neighbor_processing(
            4,
            &graph,
            |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
            Some(vec![0]),
        )
        .unwrap();
        assert_eq!(bfs.run_single_batch().unwrap(), 3);
    }

    #[test]
    fn single_batch_rejects_wide_source_sets() {
        let graph = CsrGraph::from_edges(100, &[], false);
        let bfs = MsBfs::aggregated_neighbor_processing(
            100,
            &graph,
            |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
            None,
        )
        .unwrap();
        assert!(matches!(
            bfs.run_single_batch(),
            Err(MsBfsError::TooManySources { count: 100, max: 64 })
        ));
    }

    #[test]
    fn out_of_bounds_sources_are_rejected() {
        let graph = chain();
        let err = MsBfs::aggregated_neighbor_processing(
            4,
            &graph,
            |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
            Some(vec![1, 4]),
        )
        .unwrap_err();
        assert!(matches!(err, MsBfsError::SourceOutOfBounds { node: 4, node_count: 4 }));
    }

    #[test]
    fn start_node_traversal_rediscovers_sources() {
        let cycle = CsrGraph::from_edges(3, &[(0, 1), (1, 2), (2, 0)], false);
        let reports = Reports::default();
        let bfs = MsBfs::aggregated_neighbor_processing(
            3,
            &cycle,
            |node: usize, depth: u32, sources: &mut SourceNodes<'_>| {
                reports.lock().unwrap().push((node, depth, sources.collect()));
            },
            Some(vec![0]),
        )
        .unwrap()
        .allow_start_node_traversal(true);
        bfs.run(1, None).unwrap();

        assert_eq!(
            sorted(reports),
            vec![(0, 3, vec![0]), (1, 1, vec![0]), (2, 2, vec![0])]
        );
    }

    #[test]
    fn display_describes_sources() {
        let graph = chain();
        let noop = |_: usize, _: u32, _: &mut SourceNodes<'_>| {};
        let bfs = MsBfs::aggregated_neighbor_processing(4, &graph, noop, Some(vec![3, 1])).unwrap();
        assert_eq!(bfs.to_string(), "MSBFS{1 .. 4 (2)}");
        let bfs = MsBfs::aggregated_neighbor_processing(4, &graph, noop, None).unwrap();
        assert_eq!(bfs.to_string(), "MSBFS{0 .. 4 (4)}");
    }

    #[test]
    fn empty_source_list_traverses_from_every_node() {
        let graph = chain();
        let run = |sources: Option<Vec<usize>>| {
            let reports = Reports::default();
            let bfs = MsBfs::aggregated_neighbor_processing(
                4,
                &graph,
                |node: usize, depth: u32, sources: &mut SourceNodes<'_>| {
                    reports.lock().unwrap().push((node, depth, sources.collect()));
                },
                sources,
            )
            .unwrap();
            assert_eq!(bfs.source_count(), 4);
            assert_eq!(bfs.batch_count().unwrap(), 1);
            assert_eq!(bfs.to_string(), "MSBFS{0 .. 4 (4)}");
            bfs.run(4, Some(&WorkerPool::new(4))).unwrap();
            sorted(reports)
        };

        let from_empty = run(Some(Vec::new()));
        assert_eq!(from_empty.len(), 6);
        assert_eq!(from_empty, run(None));
    }
}
