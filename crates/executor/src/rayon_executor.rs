//! Rayon-based parallel executor.
//!
//! Uses rayon's work-stealing thread pool for the per-entry stage work.
//! Dictionary stages are CPU-bound and independent per entry, which is the
//! workload rayon's pool is built for.

use kosha_traits::Executor;
use rayon::prelude::*;

/// A parallel executor using rayon's global work-stealing thread pool.
///
/// # Thread Pool Configuration
///
/// To bound the number of workers, configure rayon's global pool before
/// creating any `RayonExecutor`:
///
/// ```ignore
/// rayon::ThreadPoolBuilder::new()
///     .num_threads(4)
///     .build_global()
///     .unwrap();
///
/// let executor = RayonExecutor::new();
/// ```
///
/// `into_par_iter().map(..).collect()` preserves item order, so output is
/// identical to [`kosha_traits::SyncExecutor`] regardless of scheduling.
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    /// Cached thread count for reporting via `parallelism()`.
    num_threads: usize,
}

impl RayonExecutor {
    /// Creates a new RayonExecutor using rayon's global thread pool.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_par_iter().map(f).collect()
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        items.into_par_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}
