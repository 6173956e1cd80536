//! Running traversal batches on a bounded number of threads.
//!
//! `pool` holds the worker pool and the bounded-concurrency task runner; tasks
//! travel from the submitting thread to the workers through a
//! `crossbeam_queue::ArrayQueue` whose capacity provides the backpressure.

pub mod pool;

pub use pool::{can_run_in_parallel, run_with_concurrency, WorkerPool};
