use super::CallbackOutcome;
use crate::error::DispatchError;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Counters kept by a [`CallbackPool`].
#[derive(Debug, Default)]
struct PoolCounters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    rejected: AtomicU64,
}

/// A point-in-time copy of the pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub rejected: u64,
}

/// Runs async-mode callbacks in the background with bounded parallelism.
///
/// Submission never waits: a callback either takes a permit and is spawned
/// immediately, or is rejected with [`DispatchError::PoolSaturated`]. Results
/// are never returned to the submitter; failures and panics are logged and
/// counted.
#[derive(Debug, Clone)]
pub struct CallbackPool {
    semaphore: Arc<Semaphore>,
    limit: usize,
    counters: Arc<PoolCounters>,
}

impl CallbackPool {
    /// Creates a pool allowing `limit` callbacks in flight (at least one).
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            counters: Arc::new(PoolCounters::default()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn in_flight(&self) -> usize {
        self.limit.saturating_sub(self.semaphore.available_permits())
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Spawns `task` on the current Tokio runtime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit<F>(&self, label: String, task: F) -> Result<CallbackTicket, DispatchError>
    where
        F: Future<Output = Result<CallbackOutcome, DispatchError>> + Send + 'static,
    {
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    callback = %label,
                    limit = self.limit,
                    "Async callback rejected, pool is saturated"
                );
                return Err(DispatchError::PoolSaturated { limit: self.limit });
            }
        };
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let counters = self.counters.clone();
        let task_label = label.clone();
        let handle = tokio::spawn(async move {
            let _permit = permit;
            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(Ok(_)) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    debug!(callback = %task_label, "Async callback completed");
                }
                Ok(Err(e)) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(callback = %task_label, error = %e, "Async callback failed");
                }
                Err(_) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(callback = %task_label, "Async callback panicked");
                }
            }
        });

        Ok(CallbackTicket { label, handle })
    }
}

/// Handle to a detached callback. Dropping it does not cancel the callback.
#[derive(Debug)]
pub struct CallbackTicket {
    label: String,
    handle: JoinHandle<()>,
}

impl CallbackTicket {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the callback to finish. Its outcome is only visible through
    /// the pool's stats and logs.
    pub async fn wait(self) {
        let _ = self.handle.await;
    }
}
