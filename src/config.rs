//! Run configuration.
//!
//! A [`MsBfsConfig`] bundles the knobs of a traversal run: how many workers,
//! how partitions are sized, and how patiently the submitter waits for a full
//! task queue. It is plain data; it can be built in code or loaded from JSON.

use std::io::Read;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MsBfsError, Result};
use crate::partition::{
    adjusted_batch_size_with_max, number_aligned_partitioning_with_max_size, Partition,
    RangePartitions, DEFAULT_BATCH_SIZE,
};

/// Backpressure policy for handing tasks to a [`WorkerPool`](crate::concurrency::WorkerPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmitPolicy {
    /// Attempts before giving up; `None` means `4 × tasks`.
    pub max_wait_retries: Option<u32>,
    /// Pause between attempts, in microseconds.
    pub wait_micros: u64,
}

impl SubmitPolicy {
    /// Default pause between two submission attempts.
    pub const DEFAULT_WAIT_MICROS: u64 = 100;

    /// The pause between two submission attempts.
    pub fn wait(&self) -> Duration {
        Duration::from_micros(self.wait_micros)
    }

    /// Retry budget for submitting `tasks` tasks.
    pub fn retries_for(&self, tasks: usize) -> u32 {
        self.max_wait_retries.unwrap_or_else(|| {
            u32::try_from(tasks.saturating_mul(4))
                .unwrap_or(u32::MAX)
                .max(1)
        })
    }
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            max_wait_retries: None,
            wait_micros: Self::DEFAULT_WAIT_MICROS,
        }
    }
}

/// Configuration of an MS-BFS run and of the partitions handed to its workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsBfsConfig {
    /// Number of batches allowed to run at the same time.
    pub concurrency: usize,
    /// Whether sources may be rediscovered through a cycle.
    pub allow_start_node_traversal: bool,
    /// Lower bound for partition sizes.
    pub min_batch_size: Option<usize>,
    /// Upper bound for partition sizes.
    pub max_batch_size: Option<usize>,
    /// Partition sizes are rounded up to a multiple of this value.
    pub align_to: Option<usize>,
    /// Submission backpressure.
    pub submit: SubmitPolicy,
}

impl Default for MsBfsConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            allow_start_node_traversal: false,
            min_batch_size: None,
            max_batch_size: None,
            align_to: None,
            submit: SubmitPolicy::default(),
        }
    }
}

impl MsBfsConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(?config, "loaded msbfs configuration");
        Ok(config)
    }

    /// Parses and validates a JSON document from a reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        debug!(?config, "loaded msbfs configuration");
        Ok(config)
    }

    /// Checks the value ranges and the relations between the fields.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        if self.min_batch_size == Some(0) {
            return Err(MsBfsError::InvalidBatchSize { batch_size: 0 });
        }
        if self.max_batch_size == Some(0) {
            return Err(MsBfsError::InvalidBatchSize { batch_size: 0 });
        }
        if let (Some(min), Some(max)) = (self.min_batch_size, self.max_batch_size) {
            if min > max {
                return Err(invalid(format!(
                    "min_batch_size ({min}) must not exceed max_batch_size ({max})"
                )));
            }
        }
        if let Some(align_to) = self.align_to {
            if align_to == 0 {
                return Err(MsBfsError::InvalidBatchSize { batch_size: 0 });
            }
            if let Some(max) = self.max_batch_size {
                if max < align_to {
                    return Err(MsBfsError::InvalidAlignment {
                        align_to,
                        max_partition_size: max,
                    });
                }
            }
        }
        if self.submit.max_wait_retries == Some(0) {
            return Err(invalid("submit.max_wait_retries must be at least 1"));
        }
        Ok(())
    }

    /// Partitions `[0, node_count)` according to this configuration.
    ///
    /// With `align_to` set the partitions are number-aligned; otherwise they are
    /// equal ranges sized between `min_batch_size` and `max_batch_size`.
    pub fn partitions(&self, node_count: usize) -> Result<Vec<Partition>> {
        self.validate()?;
        let max = self.max_batch_size.unwrap_or(usize::MAX);
        match self.align_to {
            Some(align_to) => {
                number_aligned_partitioning_with_max_size(self.concurrency, node_count, align_to, max)
            }
            None => {
                let min = self.min_batch_size.unwrap_or(DEFAULT_BATCH_SIZE).min(max);
                let batch_size = adjusted_batch_size_with_max(node_count, self.concurrency, min, max);
                Ok(RangePartitions::new(node_count, batch_size)?.collect())
            }
        }
    }
}

fn invalid(message: impl Into<String>) -> MsBfsError {
    MsBfsError::InvalidConfig {
        message: message.into(),
    }
}
