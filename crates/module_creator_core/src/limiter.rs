//! Concurrency limiting for batches of GitHub calls.
//!
//! Batches are submitted all at once and the limiter decides how many of them are in
//! flight. The underlying `tokio` semaphore is fair, so with a capacity of one the tasks
//! run one after another in the order they first asked for a permit.

use std::future::Future;

use tokio::sync::Semaphore;

#[cfg(test)]
#[path = "limiter_tests.rs"]
mod tests;

pub const DEFAULT_CONCURRENCY: usize = 1;

/// Caps the number of futures of one batch that run at the same time.
///
/// Use one limiter per logical batch so unrelated batches do not wait on each other.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `capacity` concurrent tasks. A capacity of zero is
    /// treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Runs `task` once a slot is free.
    pub async fn run<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            // The semaphore is private and never closed.
            Err(_) => unreachable!("concurrency limiter semaphore closed"),
        };
        task.await
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
