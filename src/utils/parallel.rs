//! Abstraction layer for parallel iteration.
//!
//! With the `parallel` feature, Rayon's iterator traits are re-exported and [`WorkerPool`]
//! owns a dedicated Rayon thread pool. Without it, the same names resolve to serial shims so
//! callers are written once.

use thiserror::Error;

#[cfg(feature = "parallel")]
pub use rayon::prelude::{IntoParallelIterator, ParallelIterator};

#[cfg(not(feature = "parallel"))]
pub use self::fallback::*;

#[derive(Debug, Error)]
#[error("failed to start worker pool with {threads} threads: {details}")]
pub struct PoolError {
    threads: usize,
    details: String,
}

/// Explicitly sized pool on which per-structure work runs.
#[derive(Debug)]
pub struct WorkerPool {
    threads: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let threads = threads.max(1);

        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("motif-worker-{i}"))
                .build()
                .map_err(|e| PoolError {
                    threads,
                    details: e.to_string(),
                })?;
            Ok(Self { threads, pool })
        }

        #[cfg(not(feature = "parallel"))]
        Ok(Self { threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `op` with this pool as the target of any parallel iterator it drives.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(op)
        }

        #[cfg(not(feature = "parallel"))]
        op()
    }
}

#[cfg(not(feature = "parallel"))]
mod fallback {
    pub use std::iter::Iterator as ParallelIterator;

    /// Shim trait to allow `into_par_iter()` on types that implement `IntoIterator`.
    pub trait IntoParallelIterator {
        type Item;
        type Iter: Iterator<Item = Self::Item>;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Item = I::Item;
        type Iter = I::IntoIter;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_pool_clamps_to_one_thread() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.threads(), 1);
    }

    #[test]
    fn worker_pool_runs_parallel_iterators() {
        let pool = WorkerPool::new(2).unwrap();
        let values: Vec<u32> = (1..=100).collect();

        let squares: Vec<u32> = pool.install(|| values.into_par_iter().map(|v| v * v).collect());

        assert_eq!(squares.len(), 100);
        assert_eq!(squares[9], 100);
        assert_eq!(squares.iter().map(|&v| v as u64).sum::<u64>(), 338_350);
    }
}
