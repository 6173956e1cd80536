//! Work partitioning over dense node id spaces.
//!
//! A [`Partition`] is a contiguous range of node ids handed to one unit of
//! parallel work; a [`DegreePartition`] additionally carries the number of
//! relationships its nodes own. The partitioners are organized into:
//! - `batch_size`: thread-count and batch-size arithmetic shared by all partitioners
//! - `range`: equal-size contiguous chunks
//! - `aligned`: number-aligned and block-aligned chunks
//! - `degree`: chunks balanced by relationship count (eager and lazy)
//!
//! All partitioners are pure: they never mutate shared state and the partitions
//! they produce never overlap.

pub mod aligned;
pub mod batch_size;
pub mod degree;
pub mod range;

use core::fmt;
use core::ops::Range;

pub use aligned::{
    block_aligned_partitioning, number_aligned_partitioning,
    number_aligned_partitioning_with_max_size, BlockAlignedPartitions,
};
pub use batch_size::{
    adjusted_batch_size, adjusted_batch_size_power_of_two, adjusted_batch_size_with_max,
    thread_count, DEFAULT_BATCH_SIZE,
};
pub use degree::{
    custom_degree_partition, degree_partition, degree_partition_with_batch_size,
    degree_partition_with_degrees, lazy_degree_partitions, total_degree,
    ConcurrentDegreePartitions, LazyDegreePartitions, DIVISION_FACTOR, MIN_PARTITION_CAPACITY,
};
pub use range::{
    range_partition, range_partition_actual_batch_sizes, range_partition_with_batch_size,
    RangePartitions,
};

/// A contiguous range of node ids `[start_node, start_node + node_count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    start_node: usize,
    node_count: usize,
}

impl Partition {
    /// Upper bound for the number of nodes in a single partition.
    pub const MAX_NODE_COUNT: usize = (i32::MAX as usize - 32) >> 1;

    /// Creates a partition starting at `start_node` spanning `node_count` ids.
    pub const fn new(start_node: usize, node_count: usize) -> Self {
        Self {
            start_node,
            node_count,
        }
    }

    /// First node id of the partition.
    #[inline]
    pub const fn start_node(&self) -> usize {
        self.start_node
    }

    /// Number of node ids in the partition.
    #[inline]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// One past the last node id of the partition.
    #[inline]
    pub const fn end_node(&self) -> usize {
        self.start_node + self.node_count
    }

    /// The node ids as a range.
    #[inline]
    pub fn nodes(&self) -> Range<usize> {
        self.start_node..self.end_node()
    }

    /// Calls `f` once for every node id in the partition, in ascending order.
    pub fn consume(&self, f: impl FnMut(usize)) {
        self.nodes().for_each(f);
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partition{{start:{}, length:{}}}",
            self.start_node, self.node_count
        )
    }
}

/// A [`Partition`] that also records the total degree of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DegreePartition {
    partition: Partition,
    total_degree: usize,
}

impl DegreePartition {
    /// Creates a degree partition.
    pub const fn new(start_node: usize, node_count: usize, total_degree: usize) -> Self {
        Self {
            partition: Partition::new(start_node, node_count),
            total_degree,
        }
    }

    /// The underlying node range.
    #[inline]
    pub const fn partition(&self) -> Partition {
        self.partition
    }

    /// First node id of the partition.
    #[inline]
    pub const fn start_node(&self) -> usize {
        self.partition.start_node
    }

    /// Number of node ids in the partition.
    #[inline]
    pub const fn node_count(&self) -> usize {
        self.partition.node_count
    }

    /// Sum of the degrees of all nodes in the partition.
    #[inline]
    pub const fn total_degree(&self) -> usize {
        self.total_degree
    }
}

impl From<DegreePartition> for Partition {
    fn from(value: DegreePartition) -> Self {
        value.partition
    }
}

/// Supplies the degree (number of outgoing relationships) of a node.
pub trait DegreeFunction: Sync {
    /// Degree of `node`.
    fn degree(&self, node: usize) -> usize;
}

impl<F> DegreeFunction for F
where
    F: Fn(usize) -> usize + Sync,
{
    #[inline]
    fn degree(&self, node: usize) -> usize {
        self(node)
    }
}
