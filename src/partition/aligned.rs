//! Alignment-aware partitioning.
//!
//! - number-aligned: every partition (but the last) has a size that is a multiple of `align_to`
//! - block-aligned: no partition straddles a change of `id >> block_shift`

use super::batch_size::adjusted_batch_size;
use super::range::RangePartitions;
use super::Partition;
use crate::error::{MsBfsError, Result};

/// Range partitioning with batch sizes rounded up to a multiple of `align_to`.
pub fn number_aligned_partitioning(
    concurrency: usize,
    node_count: usize,
    align_to: usize,
) -> Result<Vec<Partition>> {
    number_aligned_partitioning_with_max_size(concurrency, node_count, align_to, usize::MAX)
}

/// Range partitioning with batch sizes rounded up to a multiple of `align_to` and
/// capped at the largest multiple of `align_to` not exceeding `max_partition_size`.
///
/// Fails with [`MsBfsError::InvalidAlignment`] if `max_partition_size < align_to`.
pub fn number_aligned_partitioning_with_max_size(
    concurrency: usize,
    node_count: usize,
    align_to: usize,
    max_partition_size: usize,
) -> Result<Vec<Partition>> {
    if align_to == 0 {
        return Err(MsBfsError::InvalidBatchSize { batch_size: 0 });
    }
    if max_partition_size < align_to {
        return Err(MsBfsError::InvalidAlignment {
            align_to,
            max_partition_size,
        });
    }

    let initial = adjusted_batch_size(node_count, concurrency, align_to);
    let remainder = initial % align_to;
    let mut batch_size = if remainder == 0 {
        initial
    } else {
        initial.saturating_add(align_to - remainder)
    };
    if batch_size > max_partition_size {
        batch_size = max_partition_size - max_partition_size % align_to;
    }

    Ok(RangePartitions::new(node_count, batch_size)?.collect())
}

/// Partitions the index space of `sorted_ids` so that every partition only holds ids
/// of one block, where the block of an id is `id >> block_shift`.
pub fn block_aligned_partitioning(sorted_ids: &[u64], block_shift: u32) -> BlockAlignedPartitions<'_> {
    BlockAlignedPartitions::new(sorted_ids, block_shift)
}

/// Lazy iterator behind [`block_aligned_partitioning`].
#[derive(Debug, Clone)]
pub struct BlockAlignedPartitions<'a> {
    ids: &'a [u64],
    block_shift: u32,
    cursor: usize,
    block_start: usize,
    prev_block: u64,
    done: bool,
}

impl<'a> BlockAlignedPartitions<'a> {
    /// Creates the iterator. `sorted_ids` must be sorted ascending.
    pub fn new(sorted_ids: &'a [u64], block_shift: u32) -> Self {
        debug_assert!(
            sorted_ids.windows(2).all(|w| w[0] <= w[1]),
            "ids must be sorted"
        );
        Self {
            ids: sorted_ids,
            block_shift,
            cursor: 0,
            block_start: 0,
            prev_block: 0,
            done: false,
        }
    }

    #[inline]
    fn block_of(&self, id: u64) -> u64 {
        id.checked_shr(self.block_shift).unwrap_or(0)
    }
}

impl Iterator for BlockAlignedPartitions<'_> {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.done {
            return None;
        }

        while self.cursor < self.ids.len() {
            let index = self.cursor;
            self.cursor += 1;

            let block = self.block_of(self.ids[index]);
            if block != self.prev_block {
                self.prev_block = block;
                if index > 0 {
                    let partition = Partition::new(self.block_start, index - self.block_start);
                    self.block_start = index;
                    return Some(partition);
                }
            }
        }

        self.done = true;
        if self.block_start < self.ids.len() {
            Some(Partition::new(self.block_start, self.ids.len() - self.block_start))
        } else {
            None
        }
    }
}
