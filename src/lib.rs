//! # `msbfs` - Bit-Parallel Multi-Source Breadth-First Search
//!
//! Traverses a graph from many sources at once. Every node carries one `u64` per
//! state array with one bit per source, so up to 64 sources that reach the same
//! node at the same depth share a single expansion of that node.
//!
//! ## Key Features
//!
//! - **Two execution strategies**: aggregated neighbor processing (one report per
//!   newly reached node and depth) and predecessor processing (additional per-edge
//!   reports naming the predecessor)
//! - **Batching**: any number of sources is split into independent batches of 64
//!   that run on a bounded worker pool, each worker reusing its scratch arrays
//! - **Lazy source decoding**: callbacks receive a [`SourceNodes`] cursor that
//!   decodes the bitmask on demand
//! - **Work partitioning**: range, number-aligned, block-aligned and
//!   degree-balanced partitioning of dense node id spaces
//!
//! ## Architecture
//!
//! 1. **Partitions** (`partition`): contiguous node ranges, optionally weighted by degree.
//! 2. **Source batches** (`msbfs::batch`): up to 64 sources; source `i` owns bit `i`.
//! 3. **Strategies** (`msbfs::strategy`): per-depth frontier propagation over
//!    paged bitmask arrays (`collections`).
//! 4. **Runner** (`msbfs::runner`): seeds one batch and drives a strategy to completion.
//! 5. **Coordinator** ([`MsBfs`]): splits sources into batches and dispatches them
//!    to a [`WorkerPool`] (`concurrency`).
//!
//! The graph itself stays outside: the engine consumes a [`RelationshipIterator`].
//!
//! ## Example
//!
//! ```rust
//! use msbfs::{CsrGraph, MsBfs, SourceNodes, WorkerPool};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! // a star: node 0 in the middle
//! let edges: Vec<_> = (1..100).map(|leaf| (0, leaf)).collect();
//! let graph = CsrGraph::from_edges(100, &edges, true);
//!
//! let reports = AtomicUsize::new(0);
//! let bfs = MsBfs::aggregated_neighbor_processing(
//!     graph.node_count(),
//!     &graph,
//!     |_node: usize, _depth: u32, sources: &mut SourceNodes<'_>| {
//!         reports.fetch_add(sources.size(), Ordering::Relaxed);
//!     },
//!     None,
//! )
//! .unwrap();
//!
//! let pool = WorkerPool::new(4);
//! bfs.run(4, Some(&pool)).unwrap();
//!
//! // every source reaches every other node exactly once
//! assert_eq!(reports.load(Ordering::Relaxed), 100 * 99);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collections;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod msbfs;
pub mod partition;

pub use concurrency::WorkerPool;
pub use config::{MsBfsConfig, SubmitPolicy};
pub use error::{MsBfsError, Result};
pub use graph::{CsrGraph, Degrees, RelationshipIterator};
pub use msbfs::{
    memory_estimation, ExecutionStrategy, MemoryEstimate, MsBfs, MsBfsRunner, ScratchBuffers,
    SourceBatch, SourceNodes, OMEGA,
};
pub use partition::{DegreePartition, Partition};

// Compile-time assertions for the bitmask layout
const _: () = {
    // One bit per source in a batch.
    assert!(OMEGA == u64::BITS as usize);

    // Pages hold a whole number of words per cache line.
    assert!(collections::paged_array::PAGE_SIZE % 8 == 0);
};
