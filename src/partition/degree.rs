//! Degree-balanced partitioning.
//!
//! Partitions are sized by the number of relationships their nodes own rather than
//! by node count, so every worker sees a comparable amount of relationship work.
//!
//! Two flavors exist:
//! - eager: a few large partitions, one per worker ([`degree_partition`])
//! - lazy: many small partitions pulled on demand ([`LazyDegreePartitions`],
//!   [`ConcurrentDegreePartitions`])

use std::sync::{Mutex, PoisonError};

use super::batch_size::DEFAULT_BATCH_SIZE;
use super::{DegreeFunction, DegreePartition, Partition};
use crate::error::{MsBfsError, Result};
use crate::graph::Degrees;

/// A partition closes early only once it holds this fraction of its budget.
pub const MIN_PARTITION_CAPACITY: f64 = 0.67;
/// Lazy partitions target `relationship_count / (concurrency * DIVISION_FACTOR)` relationships.
pub const DIVISION_FACTOR: usize = 10;
/// A trailing partition below this fraction of the budget is merged into its predecessor.
const MIN_LAST_PARTITION_CAPACITY: f64 = 0.2;

/// Degree-balanced partitioning of a graph.
pub fn degree_partition<G>(
    graph: &G,
    concurrency: usize,
    min_batch_size: Option<usize>,
) -> Vec<DegreePartition>
where
    G: Degrees + Sync + ?Sized,
{
    degree_partition_with_degrees(
        graph.node_count(),
        graph.relationship_count(),
        &|node| graph.degree(node),
        concurrency,
        min_batch_size,
    )
}

/// Degree-balanced partitioning over an arbitrary degree function.
///
/// With `concurrency <= 1` a single partition covering every node is returned.
pub fn degree_partition_with_degrees<D>(
    node_count: usize,
    relationship_count: usize,
    degrees: &D,
    concurrency: usize,
    min_batch_size: Option<usize>,
) -> Vec<DegreePartition>
where
    D: DegreeFunction + ?Sized,
{
    if concurrency <= 1 {
        return vec![DegreePartition::new(0, node_count, relationship_count)];
    }
    let batch_size = min_batch_size
        .unwrap_or(DEFAULT_BATCH_SIZE)
        .max(relationship_count.div_ceil(concurrency))
        .max(1);
    partition_by_budget(node_count, degrees, batch_size)
}

/// Degree-balanced partitioning with a caller-defined degree ("weight") function.
///
/// `weight_sum` may carry the precomputed sum of all weights; otherwise it is computed.
pub fn custom_degree_partition<D>(
    node_count: usize,
    degrees: &D,
    concurrency: usize,
    min_batch_size: Option<usize>,
    weight_sum: Option<usize>,
) -> Vec<DegreePartition>
where
    D: DegreeFunction + ?Sized,
{
    let weight_sum = weight_sum.unwrap_or_else(|| total_degree(node_count, degrees));
    let batch_size = min_batch_size
        .unwrap_or(DEFAULT_BATCH_SIZE)
        .max(weight_sum.div_ceil(concurrency.max(1)))
        .max(1);
    partition_by_budget(node_count, degrees, batch_size)
}

/// Degree-balanced partitioning with an explicit per-partition relationship budget.
pub fn degree_partition_with_batch_size<D>(
    node_count: usize,
    degrees: &D,
    batch_size: usize,
) -> Result<Vec<DegreePartition>>
where
    D: DegreeFunction + ?Sized,
{
    if batch_size == 0 {
        return Err(MsBfsError::InvalidBatchSize { batch_size });
    }
    Ok(partition_by_budget(node_count, degrees, batch_size))
}

/// Sum of the degrees of all nodes in `[0, node_count)`.
#[cfg(feature = "parallel")]
pub fn total_degree<D>(node_count: usize, degrees: &D) -> usize
where
    D: DegreeFunction + ?Sized,
{
    use rayon::prelude::*;

    (0..node_count).into_par_iter().map(|node| degrees.degree(node)).sum()
}

/// Sum of the degrees of all nodes in `[0, node_count)`.
#[cfg(not(feature = "parallel"))]
pub fn total_degree<D>(node_count: usize, degrees: &D) -> usize
where
    D: DegreeFunction + ?Sized,
{
    (0..node_count).map(|node| degrees.degree(node)).sum()
}

fn partition_by_budget<D>(node_count: usize, degrees: &D, batch_size: usize) -> Vec<DegreePartition>
where
    D: DegreeFunction + ?Sized,
{
    debug_assert!(batch_size > 0);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let min_partition_size = (batch_size as f64 * MIN_PARTITION_CAPACITY).round() as usize;

    let mut partitions = Vec::new();
    let mut start = 0;

    while start < node_count {
        let mut partition_size = 0usize;
        let mut end = start;

        while end < node_count && end - start < Partition::MAX_NODE_COUNT {
            let degree = degrees.degree(end);
            let large_enough = partition_size >= min_partition_size;
            if partition_size + degree > batch_size && large_enough {
                break;
            }
            end += 1;
            partition_size += degree;
        }

        partitions.push(DegreePartition::new(start, end - start, partition_size));
        start = end;
    }

    // The loop above never looks back, so a tiny trailing partition is folded into its neighbour.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let min_last_partition_size = (MIN_LAST_PARTITION_CAPACITY * batch_size as f64).round() as usize;
    if partitions.len() > 1 {
        if let Some(last) = partitions.last().copied() {
            if last.total_degree() < min_last_partition_size {
                partitions.pop();
                if let Some(prev) = partitions.pop() {
                    partitions.push(DegreePartition::new(
                        prev.start_node(),
                        prev.node_count() + last.node_count(),
                        prev.total_degree() + last.total_degree(),
                    ));
                }
            }
        }
    }

    partitions
}

/// Lazily yields many small degree-balanced partitions covering `[0, node_count)`.
pub fn lazy_degree_partitions<D>(
    node_count: usize,
    relationship_count: usize,
    concurrency: usize,
    degrees: &D,
) -> LazyDegreePartitions<'_, D>
where
    D: DegreeFunction + ?Sized,
{
    LazyDegreePartitions::new(node_count, relationship_count, concurrency, degrees)
}

/// Single-threaded lazy degree partitioner.
///
/// Each partition stops before the node that would push it over the budget; a
/// partition always holds at least one node, so a single node heavier than the
/// budget forms its own partition.
pub struct LazyDegreePartitions<'a, D: ?Sized> {
    degrees: &'a D,
    node_count: usize,
    next_node: usize,
    budget: usize,
}

impl<'a, D> LazyDegreePartitions<'a, D>
where
    D: DegreeFunction + ?Sized,
{
    /// Creates the iterator with a budget of `ceil(relationship_count / (concurrency * DIVISION_FACTOR))`.
    pub fn new(node_count: usize, relationship_count: usize, concurrency: usize, degrees: &'a D) -> Self {
        let slots = concurrency.max(1).saturating_mul(DIVISION_FACTOR);
        Self {
            degrees,
            node_count,
            next_node: 0,
            budget: relationship_count.div_ceil(slots).max(1),
        }
    }

    /// Relationship budget per partition.
    pub fn budget(&self) -> usize {
        self.budget
    }
}

impl<D> Iterator for LazyDegreePartitions<'_, D>
where
    D: DegreeFunction + ?Sized,
{
    type Item = DegreePartition;

    fn next(&mut self) -> Option<DegreePartition> {
        if self.next_node >= self.node_count {
            return None;
        }

        let start = self.next_node;
        let mut end = start;
        let mut total = 0usize;
        while end < self.node_count && end - start < Partition::MAX_NODE_COUNT {
            let degree = self.degrees.degree(end);
            if end > start && total + degree > self.budget {
                break;
            }
            total += degree;
            end += 1;
        }

        self.next_node = end;
        Some(DegreePartition::new(start, end - start, total))
    }
}

/// Multi-threaded lazy degree partitioner: any number of threads pull partitions
/// through a shared reference.
pub struct ConcurrentDegreePartitions<'a, D: ?Sized> {
    inner: Mutex<LazyDegreePartitions<'a, D>>,
}

impl<'a, D> ConcurrentDegreePartitions<'a, D>
where
    D: DegreeFunction + ?Sized,
{
    /// Creates the shared iterator.
    pub fn new(node_count: usize, relationship_count: usize, concurrency: usize, degrees: &'a D) -> Self {
        Self {
            inner: Mutex::new(LazyDegreePartitions::new(
                node_count,
                relationship_count,
                concurrency,
                degrees,
            )),
        }
    }

    /// Takes the next partition, or `None` once the node space is exhausted.
    pub fn next_partition(&self) -> Option<DegreePartition> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next()
    }
}

impl<D> Iterator for &ConcurrentDegreePartitions<'_, D>
where
    D: DegreeFunction + ?Sized,
{
    type Item = DegreePartition;

    fn next(&mut self) -> Option<DegreePartition> {
        self.next_partition()
    }
}
