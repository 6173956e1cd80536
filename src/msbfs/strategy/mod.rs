//! Per-depth frontier propagation.
//!
//! Both strategies advance all sources of a batch one depth at a time and stop
//! as soon as a depth discovers nothing new. They differ in what they report:
//! - aggregated neighbor processing reports every newly reached node once per
//!   depth, with all sources that reached it (sources themselves are not reported)
//! - predecessor processing reports every frontier node (depth 0 included) and,
//!   additionally, every relationship through which a source first reaches a node

mod anp;
mod predecessor;

use super::buffers::ScratchBuffers;
use super::source_nodes::SourceNodes;
use crate::graph::RelationshipIterator;

/// Per-edge callback type used when predecessors are not of interest.
pub type NoPredecessors = fn(usize, usize, u32, &mut SourceNodes<'_>);

/// The propagation strategy of a traversal together with its callbacks.
///
/// `per_node` is called as `(node, depth, sources)`; `per_neighbor` as
/// `(target, predecessor, depth, sources)`.
#[derive(Debug, Clone)]
pub enum ExecutionStrategy<N, P = NoPredecessors> {
    /// Aggregated neighbor processing (ANP).
    AggregatedNeighborProcessing {
        /// Called for every newly reached node.
        per_node: N,
    },
    /// Predecessor processing.
    Predecessor {
        /// Called for every frontier node.
        per_node: N,
        /// Called for every relationship that extends the frontier.
        per_neighbor: P,
    },
}

impl<N, P> ExecutionStrategy<N, P>
where
    N: Fn(usize, u32, &mut SourceNodes<'_>) + Sync,
    P: Fn(usize, usize, u32, &mut SourceNodes<'_>) + Sync,
{
    /// Returns `true` if the strategy needs the `seen_next` staging array.
    pub fn requires_seen_next(&self) -> bool {
        matches!(self, Self::Predecessor { .. })
    }

    /// Runs the prepared batch in `buffers` to completion and returns the last
    /// depth at which anything was reported.
    ///
    /// # Panics
    ///
    /// Panics for predecessor processing if `buffers` has no `seen_next` array.
    pub fn run<R>(
        &self,
        relationships: &R,
        buffers: &mut ScratchBuffers,
        sources: &mut SourceNodes<'_>,
    ) -> u32
    where
        R: RelationshipIterator,
    {
        match self {
            Self::AggregatedNeighborProcessing { per_node } => {
                anp::run(relationships, buffers, sources, per_node)
            }
            Self::Predecessor {
                per_node,
                per_neighbor,
            } => predecessor::run(relationships, buffers, sources, per_node, per_neighbor),
        }
    }
}
