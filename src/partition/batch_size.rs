//! Thread-count and batch-size arithmetic.

use crate::error::{MsBfsError, Result};

/// Smallest batch a partitioner produces unless the caller asks for less.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Returns the number of batches of `batch_size` needed to cover `element_count` elements.
///
/// At least one batch is always returned.
pub fn thread_count(batch_size: usize, element_count: usize) -> Result<usize> {
    if batch_size == 0 {
        return Err(MsBfsError::InvalidBatchSize { batch_size });
    }
    if batch_size >= element_count {
        return Ok(1);
    }
    Ok(element_count.div_ceil(batch_size))
}

/// Returns a batch size that divides `node_count` evenly across `concurrency`
/// workers, but is never smaller than `min_batch_size`.
///
/// A `concurrency` of zero means "one node per batch".
pub fn adjusted_batch_size(node_count: usize, concurrency: usize, min_batch_size: usize) -> usize {
    let concurrency = if concurrency == 0 {
        node_count.max(1)
    } else {
        concurrency
    };
    let target = if concurrency >= node_count {
        1
    } else {
        node_count.div_ceil(concurrency)
    };
    min_batch_size.max(target)
}

/// Like [`adjusted_batch_size`], additionally capped at `max_batch_size`.
pub fn adjusted_batch_size_with_max(
    node_count: usize,
    concurrency: usize,
    min_batch_size: usize,
    max_batch_size: usize,
) -> usize {
    max_batch_size.min(adjusted_batch_size(node_count, concurrency, min_batch_size))
}

/// Returns a batch size that is at least `batch_size`, a power of two, and splits
/// `node_count` into a number of batches addressable by an `i32`.
pub fn adjusted_batch_size_power_of_two(node_count: usize, batch_size: usize) -> usize {
    let mut batch_size = batch_size.max(1).next_power_of_two();
    while node_count.saturating_add(batch_size).saturating_add(1) / batch_size > i32::MAX as usize {
        batch_size <<= 1;
    }
    batch_size
}
