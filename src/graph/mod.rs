//! The graph capabilities consumed by the traversal and the partitioners.
//!
//! The engine never owns a graph representation; it is handed something that can
//! enumerate the outgoing relationships of a node ([`RelationshipIterator`]) and,
//! for degree-balanced partitioning, report degrees ([`Degrees`]).
//! [`CsrGraph`] is a compact in-memory implementation of both.

pub mod csr;

pub use csr::CsrGraph;

/// Enumerates the outgoing relationships of a node.
///
/// Implementations are read-only during a traversal. Every concurrently running
/// batch works on its own [`concurrent_copy`](Self::concurrent_copy).
pub trait RelationshipIterator: Send {
    /// Calls `f(node, target)` for every relationship leaving `node`.
    fn for_each_relationship<F>(&self, node: usize, f: F)
    where
        F: FnMut(usize, usize);

    /// Calls `f(node, target, weight)` for every relationship leaving `node`.
    ///
    /// Relationships without a weight report `fallback`; by default every
    /// relationship does.
    fn for_each_relationship_weighted<F>(&self, node: usize, fallback: f64, mut f: F)
    where
        F: FnMut(usize, usize, f64),
    {
        self.for_each_relationship(node, |source, target| f(source, target, fallback));
    }

    /// Returns an iterator over the same relationships that can be moved to another thread.
    fn concurrent_copy(&self) -> Self
    where
        Self: Sized;
}

/// Degree information of a graph.
pub trait Degrees {
    /// Size of the node id space.
    fn node_count(&self) -> usize;

    /// Total number of relationships.
    fn relationship_count(&self) -> usize;

    /// Number of relationships leaving `node`.
    fn degree(&self, node: usize) -> usize;
}

impl<G: Degrees + ?Sized> Degrees for &G {
    #[inline]
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    #[inline]
    fn relationship_count(&self) -> usize {
        (**self).relationship_count()
    }

    #[inline]
    fn degree(&self, node: usize) -> usize {
        (**self).degree(node)
    }
}
