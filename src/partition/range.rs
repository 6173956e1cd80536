//! Equal-size range partitioning.

use super::batch_size::{adjusted_batch_size, DEFAULT_BATCH_SIZE};
use super::Partition;
use crate::error::{MsBfsError, Result};

/// Lazily yields consecutive partitions of `batch_size` ids covering `[0, node_count)`.
///
/// The last partition holds the remainder.
#[derive(Debug, Clone)]
pub struct RangePartitions {
    next_start: usize,
    node_count: usize,
    batch_size: usize,
}

impl RangePartitions {
    /// Creates the iterator.
    ///
    /// Fails with [`MsBfsError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(node_count: usize, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(MsBfsError::InvalidBatchSize { batch_size });
        }
        Ok(Self {
            next_start: 0,
            node_count,
            batch_size,
        })
    }

    /// The configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Iterator for RangePartitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.next_start >= self.node_count {
            return None;
        }
        let start = self.next_start;
        let len = self.batch_size.min(self.node_count - start);
        self.next_start = start + len;
        Some(Partition::new(start, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.node_count - self.next_start.min(self.node_count)).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangePartitions {}

/// Splits `[0, node_count)` into at most `concurrency` equal chunks, each holding at
/// least `min_batch_size` ids (default [`DEFAULT_BATCH_SIZE`]).
pub fn range_partition(
    concurrency: usize,
    node_count: usize,
    min_batch_size: Option<usize>,
) -> Vec<Partition> {
    let batch_size = adjusted_batch_size(
        node_count,
        concurrency,
        min_batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
    );
    RangePartitions {
        next_start: 0,
        node_count,
        batch_size,
    }
    .collect()
}

/// Splits `[0, node_count)` into chunks of exactly `batch_size` ids (the last one may be smaller).
pub fn range_partition_with_batch_size(node_count: usize, batch_size: usize) -> Result<Vec<Partition>> {
    Ok(RangePartitions::new(node_count, batch_size)?.collect())
}

/// The sizes of the partitions [`range_partition`] would produce.
pub fn range_partition_actual_batch_sizes(
    concurrency: usize,
    node_count: usize,
    min_batch_size: Option<usize>,
) -> Vec<usize> {
    range_partition(concurrency, node_count, min_batch_size)
        .iter()
        .map(Partition::node_count)
        .collect()
}
