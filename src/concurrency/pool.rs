//! Bounded-concurrency task execution.
//!
//! A [`WorkerPool`] describes how many threads may run tasks at once and how the
//! submitter behaves when they fall behind. [`run_with_concurrency`] spawns scoped
//! workers for the duration of one run, feeds them through a bounded
//! [`ArrayQueue`], and re-raises the first panic a task produced once all workers
//! are joined. A run only succeeds if every task it was given has executed.
//!
//! Each worker owns a lazily created state value (scratch buffers, typically) that
//! it hands to every task it executes.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::panic;
use std::thread;
use std::time::Duration;

use crossbeam_queue::ArrayQueue;
use crossbeam_utils::Backoff;
use tracing::{debug, warn};

use crate::config::{MsBfsConfig, SubmitPolicy};
use crate::error::{MsBfsError, Result};

/// Slots in the task queue per worker.
const QUEUE_SLOTS_PER_WORKER: usize = 4;
/// Idle workers sleep this long once spinning stops paying off.
const IDLE_SLEEP: Duration = Duration::from_micros(50);

/// A fixed-size pool of workers.
#[derive(Debug)]
pub struct WorkerPool {
    threads: usize,
    submit: SubmitPolicy,
    shutdown: AtomicBool,
}

impl WorkerPool {
    /// Creates a pool running at most `threads` tasks at once.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn new(threads: usize) -> Self {
        Self::with_submit_policy(threads, SubmitPolicy::default())
    }

    /// Creates a pool with an explicit submission policy.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is zero.
    pub fn with_submit_policy(threads: usize, submit: SubmitPolicy) -> Self {
        assert!(threads > 0, "a worker pool needs at least one thread");
        Self {
            threads,
            submit,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Creates a pool sized by `config.concurrency`.
    pub fn from_config(config: &MsBfsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_submit_policy(config.concurrency, config.submit))
    }

    /// Maximum number of tasks running at once.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// The submission policy.
    pub fn submit_policy(&self) -> SubmitPolicy {
        self.submit
    }

    /// Stops workers from taking new tasks. Later runs execute on the calling thread.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Returns `true` if `executor` exists and still accepts work.
pub fn can_run_in_parallel(executor: Option<&WorkerPool>) -> bool {
    executor.is_some_and(|pool| !pool.is_shutdown())
}

/// Runs every task with at most `concurrency` tasks in flight.
///
/// Each worker calls `init` once, before its first task, and passes the resulting
/// state to `work` for every task it runs. Without a usable executor, or with
/// `concurrency <= 1`, the tasks run in order on the calling thread sharing one state.
///
/// # Errors
///
/// [`MsBfsError::SubmissionFailed`] if the task queue stayed full without any
/// worker making progress for the whole retry budget, and
/// [`MsBfsError::PoolShutdown`] if the pool was shut down after the last task was
/// queued but before all tasks executed.
///
/// # Panics
///
/// Re-raises the first panic of any task after all workers have stopped.
pub fn run_with_concurrency<T, S, I, W>(
    executor: Option<&WorkerPool>,
    concurrency: usize,
    tasks: impl IntoIterator<Item = T>,
    init: I,
    work: W,
) -> Result<()>
where
    T: Send,
    I: Fn() -> S + Sync,
    W: Fn(&mut S, T) + Sync,
{
    let pool = match executor {
        Some(pool) if concurrency > 1 && can_run_in_parallel(executor) => pool,
        _ => {
            run_sequentially(tasks, &init, &work);
            return Ok(());
        }
    };

    let tasks = tasks.into_iter();
    let workers = concurrency.min(pool.threads()).max(1);
    let queue = ArrayQueue::new(workers * QUEUE_SLOTS_PER_WORKER);
    let shared = Shared {
        queue: &queue,
        pool,
        closed: AtomicBool::new(false),
        aborted: AtomicBool::new(false),
        active: AtomicUsize::new(0),
        completed: AtomicUsize::new(0),
    };

    debug!(workers, queue_capacity = queue.capacity(), "spawning workers");

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| shared.work_loop(&init, &work)))
            .collect();

        let submitted = shared.submit_all(tasks);
        if submitted.is_err() {
            shared.aborted.store(true, Ordering::Release);
        }
        shared.closed.store(true, Ordering::Release);

        let mut first_panic = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }

        let submitted = submitted?;
        let completed = shared.completed.load(Ordering::Acquire);
        if completed < submitted {
            warn!(submitted, completed, "worker pool shut down with queued tasks");
            return Err(MsBfsError::PoolShutdown {
                unfinished: submitted - completed,
                submitted,
            });
        }
        Ok(())
    })
}

fn run_sequentially<T, S, I, W>(tasks: impl IntoIterator<Item = T>, init: &I, work: &W)
where
    I: Fn() -> S,
    W: Fn(&mut S, T),
{
    let mut state = None;
    for task in tasks {
        work(state.get_or_insert_with(init), task);
    }
}

struct Shared<'a, T> {
    queue: &'a ArrayQueue<T>,
    pool: &'a WorkerPool,
    /// Set once the submitter has pushed its last task.
    closed: AtomicBool,
    /// Set when a worker panicked or submission failed.
    aborted: AtomicBool,
    /// Number of tasks currently executing.
    active: AtomicUsize,
    /// Number of tasks that ran to completion.
    completed: AtomicUsize,
}

impl<T> Shared<'_, T> {
    fn work_loop<S, I, W>(&self, init: &I, work: &W)
    where
        I: Fn() -> S,
        W: Fn(&mut S, T),
    {
        let _guard = AbortOnPanic(&self.aborted);
        let backoff = Backoff::new();
        let mut state = None;

        loop {
            if self.aborted.load(Ordering::Acquire) || self.pool.is_shutdown() {
                return;
            }

            let task = match self.queue.pop() {
                Some(task) => task,
                // the last push may land between the failed pop and the close flag
                None if self.closed.load(Ordering::Acquire) => match self.queue.pop() {
                    Some(task) => task,
                    None => return,
                },
                None => {
                    if backoff.is_completed() {
                        thread::sleep(IDLE_SLEEP);
                    } else {
                        backoff.snooze();
                    }
                    continue;
                }
            };

            backoff.reset();
            self.active.fetch_add(1, Ordering::AcqRel);
            work(state.get_or_insert_with(init), task);
            self.completed.fetch_add(1, Ordering::AcqRel);
            self.active.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Queues every task and returns how many were queued.
    fn submit_all(&self, tasks: impl Iterator<Item = T>) -> Result<usize> {
        let policy = self.pool.submit_policy();
        let (lower, upper) = tasks.size_hint();
        let max_tries = policy.retries_for(upper.unwrap_or(lower));
        let mut tries = 0u32;
        let mut submitted = 0;

        for task in tasks {
            let mut pending = task;
            loop {
                // a panicking worker is re-raised by the caller
                if self.aborted.load(Ordering::Acquire) {
                    return Ok(submitted);
                }
                match self.queue.push(pending) {
                    Ok(()) => break,
                    Err(rejected) => pending = rejected,
                }

                if self.active.load(Ordering::Acquire) == 0 {
                    tries += 1;
                    if tries > max_tries {
                        warn!(
                            tries,
                            wait_micros = policy.wait_micros,
                            "task queue stayed full without progress, giving up"
                        );
                        return Err(MsBfsError::SubmissionFailed {
                            tries,
                            wait_micros: policy.wait_micros,
                        });
                    }
                }
                thread::sleep(policy.wait());
            }
            submitted += 1;
        }
        Ok(submitted)
    }
}

/// Flags the run as aborted when the owning worker unwinds.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_without_executor() {
        let inits = AtomicUsize::new(0);
        let sum = AtomicUsize::new(0);
        run_with_concurrency(
            None,
            4,
            1..=10usize,
            || inits.fetch_add(1, Ordering::Relaxed),
            |_, task| {
                sum.fetch_add(task, Ordering::Relaxed);
            },
        )
        .unwrap();
        assert_eq!(inits.load(Ordering::Relaxed), 1);
        assert_eq!(sum.load(Ordering::Relaxed), 55);
    }

    #[test]
    fn parallel_runs_every_task_once() {
        let pool = WorkerPool::new(4);
        let sum = AtomicUsize::new(0);
        let inits = AtomicUsize::new(0);
        run_with_concurrency(
            Some(&pool),
            4,
            0..1_000usize,
            || inits.fetch_add(1, Ordering::Relaxed),
            |_, task| {
                sum.fetch_add(task, Ordering::Relaxed);
            },
        )
        .unwrap();
        assert_eq!(sum.load(Ordering::Relaxed), (0..1_000).sum::<usize>());
        assert!(inits.load(Ordering::Relaxed) <= 4);
    }

    #[test]
    fn shut_down_pool_falls_back() {
        let pool = WorkerPool::new(4);
        pool.shutdown();
        assert!(!can_run_in_parallel(Some(&pool)));

        let caller = thread::current().id();
        run_with_concurrency(Some(&pool), 4, 0..8, || (), |_, _task: i32| {
            assert_eq!(thread::current().id(), caller);
        })
        .unwrap();
    }

    #[test]
    #[should_panic(expected = "task 13 failed")]
    fn task_panics_are_propagated() {
        let pool = WorkerPool::new(2);
        let _ = run_with_concurrency(Some(&pool), 2, 0..100, || (), |_, task: i32| {
            assert!(task != 13, "task 13 failed");
        });
    }

    #[test]
    fn shutdown_after_the_last_push_reports_unfinished_tasks() {
        let pool = WorkerPool::new(2);
        let ran = AtomicUsize::new(0);
        // six tasks fit into the queue, so submission succeeds before the shutdown
        let result = run_with_concurrency(Some(&pool), 2, 0..6, || (), |_, task: i32| {
            ran.fetch_add(1, Ordering::Relaxed);
            if task == 0 {
                pool.shutdown();
            }
        });

        let ran = ran.load(Ordering::Relaxed);
        match result {
            Err(MsBfsError::PoolShutdown {
                unfinished,
                submitted,
            }) => {
                assert_eq!(submitted, 6);
                assert_eq!(unfinished, 6 - ran);
            }
            Ok(()) => assert_eq!(ran, 6),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn from_config_uses_concurrency() {
        let config = MsBfsConfig {
            concurrency: 3,
            ..MsBfsConfig::default()
        };
        let pool = WorkerPool::from_config(&config).unwrap();
        assert_eq!(pool.threads(), 3);
        assert_eq!(pool.submit_policy(), SubmitPolicy::default());
    }
}
