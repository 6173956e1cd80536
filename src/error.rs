//! Error types shared by the traversal engine, the partitioners and the worker pool.

use thiserror::Error;

/// Errors reported by `msbfs`.
///
/// Every variant describes a caller or configuration mistake detected before any
/// traversal work starts, except [`MsBfsError::SubmissionFailed`] and
/// [`MsBfsError::PoolShutdown`], which the worker pool raises when it cannot
/// get every task executed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MsBfsError {
    /// A single batch was given more sources than fit into one bitmask word.
    #[error("a batch supports at most {max} sources, but got {count}")]
    TooManySources {
        /// Number of sources that were supplied.
        count: usize,
        /// The batch width (64).
        max: usize,
    },

    /// Explicit source ids must be sorted in ascending order.
    #[error("source nodes must be sorted ascending, but {previous} precedes {next}")]
    UnsortedSources {
        /// The id that was found first.
        previous: usize,
        /// The smaller id that followed it.
        next: usize,
    },

    /// A source id does not belong to the node id space.
    #[error("source node {node} is out of bounds for a graph with {node_count} nodes")]
    SourceOutOfBounds {
        /// The offending source id.
        node: usize,
        /// Size of the node id space.
        node_count: usize,
    },

    /// The number of batches needed for the sources cannot be addressed.
    #[error("unable to run MS-BFS on {sources} sources: {batches} batches exceed the addressable batch count")]
    CapacityExceeded {
        /// Number of sources requested.
        sources: usize,
        /// Number of batches that would be required.
        batches: u64,
    },

    /// Batch sizes must be strictly positive.
    #[error("invalid batch size: {batch_size}")]
    InvalidBatchSize {
        /// The rejected batch size.
        batch_size: usize,
    },

    /// A partition cap was requested that cannot hold a single aligned block.
    #[error(
        "maximum size of a partition must be at least as much as its desired alignment \
         but got align={align_to} and max_partition_size={max_partition_size}"
    )]
    InvalidAlignment {
        /// Requested alignment.
        align_to: usize,
        /// Requested maximum partition size.
        max_partition_size: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Human readable description of the problem.
        message: String,
    },

    /// The bounded task queue stayed full while no worker made progress.
    #[error(
        "attempted to submit tasks {tries} times with a {wait_micros} microsecond delay \
         between each attempt, but ran out of time"
    )]
    SubmissionFailed {
        /// Number of submission attempts.
        tries: u32,
        /// Wait between attempts.
        wait_micros: u64,
    },

    /// The worker pool was shut down while queued tasks were still waiting.
    #[error("the worker pool was shut down before {unfinished} of {submitted} tasks ran")]
    PoolShutdown {
        /// Tasks that were queued but never executed.
        unfinished: usize,
        /// Tasks that were queued.
        submitted: usize,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MsBfsError>;
