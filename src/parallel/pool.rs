//! Rayon thread pool configuration for slate simulation.
//!
//! Use [WorkerPool::install] to run a parallel slate with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// Configures how many worker threads run parallel simulation calls.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self { workers: 0 }
    }
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

    /// Run a closure on a thread pool with this worker count. With
    /// [workers](WorkerPool::workers) at 0 the global Rayon pool is used;
    /// otherwise a temporary pool with that many threads is built.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            f()
        } else {
            match ThreadPoolBuilder::new().num_threads(self.workers).build() {
                Ok(pool) => pool.install(f),
                Err(_) => f(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_runs_closure() {
        let pool = WorkerPool::with_workers(2);
        let result = pool.install(|| 21 * 2);
        assert_eq!(result, 42);
    }

    #[test]
    fn zero_workers_uses_global_pool() {
        let pool = WorkerPool::default_workers();
        assert_eq!(pool.install(|| 7), 7);
    }
}
