//! A compact CSR (compressed sparse row) graph.
//!
//! Memory layout:
//! - `offsets`: `Vec<usize>` of length `n + 1` (row offsets)
//! - `targets`: contiguous targets of each row
//! - `weights`: optional, parallel to `targets`

use super::{Degrees, RelationshipIterator};

/// An immutable CSR graph over the dense id space `[0, node_count)`.
///
/// ### Performance Characteristics
/// | Operation | Complexity |
/// |-----------|------------|
/// | `from_adjacency` | \(O(n + m)\) |
/// | `from_edges` | \(O(n + m)\) |
/// | `neighbors` | \(O(1)\) |
/// | `degree` | \(O(1)\) |
/// | `has_edge` | \(O(\text{out-degree})\) |
#[derive(Debug, Clone, PartialEq)]
pub struct CsrGraph {
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Option<Vec<f64>>,
}

impl CsrGraph {
    /// Builds a CSR graph from an adjacency list.
    ///
    /// # Panics
    ///
    /// Panics if any relationship references a node out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        let mut total = 0usize;
        for targets in adjacency {
            total += targets.len();
            offsets.push(total);
        }

        let mut targets = Vec::with_capacity(total);
        for (u, row) in adjacency.iter().enumerate() {
            for &v in row {
                assert!(v < n, "relationship {u}->{v} is out of bounds for n={n}");
                targets.push(v);
            }
        }

        Self {
            offsets,
            targets,
            weights: None,
        }
    }

    /// Builds a CSR graph directly from CSR parts.
    ///
    /// # Panics
    /// - if `offsets` is empty
    /// - if offsets are not monotone
    /// - if `offsets.last() != targets.len()`
    /// - if a target is out of bounds
    pub fn from_csr_parts(offsets: Vec<usize>, targets: Vec<usize>) -> Self {
        assert!(!offsets.is_empty(), "offsets must have length n+1");
        let n = offsets.len() - 1;
        for w in offsets.windows(2) {
            assert!(w[0] <= w[1], "offsets must be monotone");
        }
        assert!(
            offsets.last().copied() == Some(targets.len()),
            "offsets last must equal targets length"
        );
        for &v in &targets {
            assert!(v < n, "relationship to {v} out of bounds for n={n}");
        }

        Self {
            offsets,
            targets,
            weights: None,
        }
    }

    /// Builds a graph with `node_count` nodes from a list of `(source, target)` pairs.
    ///
    /// With `undirected`, every pair is stored in both directions. Relationships
    /// keep their input order per source node.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is out of bounds.
    pub fn from_edges(node_count: usize, edges: &[(usize, usize)], undirected: bool) -> Self {
        let (offsets, order) = Self::layout(node_count, edges.iter().copied(), undirected);
        let targets = order.into_iter().map(|(target, _)| target).collect();
        Self {
            offsets,
            targets,
            weights: None,
        }
    }

    /// Like [`from_edges`](Self::from_edges) with a weight per relationship.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is out of bounds.
    pub fn from_weighted_edges(
        node_count: usize,
        edges: &[(usize, usize, f64)],
        undirected: bool,
    ) -> Self {
        let (offsets, order) =
            Self::layout(node_count, edges.iter().map(|&(s, t, _)| (s, t)), undirected);
        let (targets, weights) = order
            .into_iter()
            .map(|(target, index)| (target, edges[index].2))
            .unzip();
        Self {
            offsets,
            targets,
            weights: Some(weights),
        }
    }

    /// Counting sort of the relationships by source; returns the offsets and,
    /// per slot, the target together with the index of the input pair it came from.
    fn layout(
        node_count: usize,
        edges: impl Iterator<Item = (usize, usize)> + Clone,
        undirected: bool,
    ) -> (Vec<usize>, Vec<(usize, usize)>) {
        let mut offsets = vec![0usize; node_count + 1];
        for (s, t) in edges.clone() {
            assert!(
                s < node_count && t < node_count,
                "relationship {s}->{t} is out of bounds for n={node_count}"
            );
            offsets[s + 1] += 1;
            if undirected {
                offsets[t + 1] += 1;
            }
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut slots = vec![(0usize, 0usize); offsets[node_count]];
        for (index, (s, t)) in edges.enumerate() {
            slots[cursor[s]] = (t, index);
            cursor[s] += 1;
            if undirected {
                slots[cursor[t]] = (s, index);
                cursor[t] += 1;
            }
        }
        (offsets, slots)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of stored relationships (undirected pairs count twice).
    pub fn relationship_count(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if the graph carries relationship weights.
    pub fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    /// Returns the out-neighbors of `node`.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        assert!(node < self.node_count(), "node {node} out of bounds");
        &self.targets[self.offsets[node]..self.offsets[node + 1]]
    }

    /// Returns the weights of the relationships leaving `node`, if the graph is weighted.
    pub fn weights(&self, node: usize) -> Option<&[f64]> {
        assert!(node < self.node_count(), "node {node} out of bounds");
        self.weights
            .as_ref()
            .map(|w| &w[self.offsets[node]..self.offsets[node + 1]])
    }

    /// Returns the out-degree of a node.
    pub fn degree(&self, node: usize) -> usize {
        assert!(node < self.node_count(), "node index out of bounds");
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Checks if a relationship exists from `from` to `to`.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.neighbors(from).contains(&to)
    }
}

impl Degrees for CsrGraph {
    fn node_count(&self) -> usize {
        CsrGraph::node_count(self)
    }

    fn relationship_count(&self) -> usize {
        CsrGraph::relationship_count(self)
    }

    fn degree(&self, node: usize) -> usize {
        CsrGraph::degree(self, node)
    }
}

impl RelationshipIterator for &CsrGraph {
    #[inline]
    fn for_each_relationship<F>(&self, node: usize, mut f: F)
    where
        F: FnMut(usize, usize),
    {
        for &target in self.neighbors(node) {
            f(node, target);
        }
    }

    fn for_each_relationship_weighted<F>(&self, node: usize, fallback: f64, mut f: F)
    where
        F: FnMut(usize, usize, f64),
    {
        match self.weights(node) {
            Some(weights) => {
                for (&target, &weight) in self.neighbors(node).iter().zip(weights) {
                    f(node, target, weight);
                }
            }
            None => {
                for &target in self.neighbors(node) {
                    f(node, target, fallback);
                }
            }
        }
    }

    #[inline]
    fn concurrent_copy(&self) -> Self {
        *self
    }
}
