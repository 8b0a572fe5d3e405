//! Rayon thread pool configuration for extraction batches.
//!
//! Use [WorkerPool::install] to scrape many pages with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;
use tracing::warn;

/// Configures how many worker threads are used for parallel batch execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a thread pool with this worker count. If [workers](WorkerPool::workers) is 0,
    /// uses the global Rayon pool. A pool that cannot be built also falls back to the global one.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                warn!(target: "liandrys::load", workers = self.workers, error = %err, "falling back to global rayon pool");
                f()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn install_runs_parallel_work_with_fixed_workers() {
        let pool = WorkerPool::with_workers(2);
        let total: u64 = pool.install(|| (1..=100u64).into_par_iter().sum());
        assert_eq!(total, 5050);
        assert_eq!(pool.install(rayon::current_num_threads), 2);
    }

    #[test]
    fn zero_workers_uses_the_global_pool() {
        assert_eq!(WorkerPool::default_workers().workers, 0);
        assert_eq!(WorkerPool::default_workers().install(|| 7), 7);
    }
}
