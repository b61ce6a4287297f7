//! Detached background work.
//!
//! The redirect path hands click telemetry to a [`TaskSpawner`] so the response never
//! waits on it. Production uses [`TokioSpawner`]; tests use [`DeferredSpawner`] to run
//! the queued work at a point of their choosing.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;

pub type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs fire-and-forget tasks.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxTask);
}

/// Spawns onto the current Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxTask) {
        tokio::spawn(task);
    }
}

/// Collects tasks until [`DeferredSpawner::run_pending`] is awaited.
#[derive(Default)]
pub struct DeferredSpawner {
    queue: Mutex<Vec<BoxTask>>,
}

impl DeferredSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Runs every queued task to completion, in submission order.
    ///
    /// Returns how many tasks ran.
    pub async fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.lock());
        let count = tasks.len();
        for task in tasks {
            task.await;
        }
        count
    }
}

impl TaskSpawner for DeferredSpawner {
    fn spawn(&self, task: BoxTask) {
        self.queue.lock().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_deferred_spawner_runs_on_demand() {
        let spawner = DeferredSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = counter.clone();
            spawner.spawn(Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(spawner.pending(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(spawner.run_pending().await, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(spawner.pending(), 0);
    }

    #[tokio::test]
    async fn test_tokio_spawner_detaches() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        TokioSpawner.spawn(Box::pin(async move {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }
}
