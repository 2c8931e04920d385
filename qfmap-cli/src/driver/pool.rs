//! Fold Worker Pool
//!
//! Bounded rayon pool for independent scoring tasks. Results come back in
//! submission order whatever the pool size; the first failing task aborts
//! the whole batch.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt::Display;
use thiserror::Error;

/// Fold pool errors
#[derive(Debug, Error)]
pub enum PoolError {
    /// The thread pool could not be created
    #[error("failed to build worker pool: {0}")]
    Build(String),

    /// A task returned an error
    #[error("task {index} failed: {message}")]
    Task {
        /// Submission index of the task
        index: usize,
        /// Rendered task error
        message: String,
    },
}

/// Fixed-size pool for fold scoring
pub struct FoldPool {
    pool: ThreadPool,
    workers: usize,
}

impl FoldPool {
    /// Pool with `jobs` workers; `0` uses the available parallelism.
    pub fn new(jobs: usize) -> Result<Self, PoolError> {
        let workers = if jobs == 0 { default_jobs() } else { jobs };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("qfmap-fold-{}", i))
            .build()
            .map_err(|e| PoolError::Build(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` on every input and return the outputs in input order.
    pub fn map<T, R, E, F>(&self, inputs: &[T], task: F) -> Result<Vec<R>, PoolError>
    where
        T: Sync,
        R: Send,
        E: Display,
        F: Fn(usize, &T) -> Result<R, E> + Sync,
    {
        self.pool.install(|| {
            inputs
                .par_iter()
                .enumerate()
                .map(|(index, input)| {
                    task(index, input).map_err(|e| PoolError::Task {
                        index,
                        message: e.to_string(),
                    })
                })
                .collect()
        })
    }
}

/// Host concurrency, at least one
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_results_keep_submission_order() {
        let inputs: Vec<u64> = (0..16).collect();
        for jobs in [1, 2, 4, 7] {
            let pool = FoldPool::new(jobs).unwrap();
            let out = pool
                .map(&inputs, |_, &x| -> Result<u64, String> {
                    // Early tasks finish last
                    std::thread::sleep(Duration::from_millis(16 - x));
                    Ok(x * 10)
                })
                .unwrap();
            assert_eq!(out, inputs.iter().map(|x| x * 10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_task_failure_aborts() {
        let pool = FoldPool::new(2).unwrap();
        let err = pool
            .map(&[1, 2, 3], |i, _| if i == 1 { Err("boom") } else { Ok(i) })
            .unwrap_err();
        assert!(matches!(err, PoolError::Task { index: 1, .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_zero_jobs_uses_host_parallelism() {
        let pool = FoldPool::new(0).unwrap();
        assert_eq!(pool.workers(), default_jobs());
    }
}
