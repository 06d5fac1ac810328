//! Executor trait for abstracting parallel execution strategies.
//!
//! Pipeline stages are embarrassingly parallel within a stage (independent
//! per-entry work) and strictly ordered between stages. The executor runs
//! one stage's per-item work; the synchronization barrier is the return
//! from `execute_all`.

use std::fmt::Debug;
use thiserror::Error;

/// Error type for executor operations.
#[derive(Error, Debug, Clone)]
pub enum ExecutorError {
    #[error("Worker panicked: {0}")]
    WorkerPanic(String),

    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

/// A strategy for running independent per-item work.
///
/// Implementations must preserve item order in the returned vector so that
/// stage output stays deterministic regardless of scheduling.
pub trait Executor: Send + Sync + Debug {
    /// Runs `f` over every item and returns the results in item order.
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Runs fallible work over every item; per-item errors are returned in
    /// place, never short-circuited, so a stage always sees every outcome.
    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static;

    /// The number of items this executor works on concurrently.
    fn parallelism(&self) -> usize;

    /// Returns a human-readable name for this executor (for logging).
    fn name(&self) -> &'static str;
}

/// Sequential executor: runs every item on the calling thread.
///
/// The baseline implementation, and the reference for determinism checks —
/// any parallel executor must produce the same output vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn execute_all_fallible<T, R, E, F>(&self, items: Vec<T>, f: F) -> Vec<Result<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Result<R, E> + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}
