//! Task scope tied to the lifetime of a reducer.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use tokio::task::JoinHandle;

/// Owns the background tasks spawned on behalf of a reducer.
///
/// Dropping the scope aborts every task that is still running, which is how
/// subscriptions, timers and in-flight writes are cancelled when a screen is
/// left.
#[derive(Debug, Default)]
pub struct TaskScope {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Number of tasks still running.
    pub fn active(&self) -> usize {
        self.lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Abort every running task.
    pub fn cancel_all(&self) {
        for task in self.lock().drain(..) {
            task.abort();
        }
    }

    // A poisoned list still holds live handles that must be aborted.
    fn lock(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
