//! Task queue (C2): a mutex-protected FIFO paired with a counting semaphore.
//!
//! Submission never blocks. Consumers wait on the semaphore; a wakeup with nothing in
//! the queue is treated as a shutdown signal rather than an error, since the supervisor
//! releases one permit per worker on shutdown regardless of queue contents.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Semaphore};

use crate::task::Task;

pub struct TaskQueue {
    queue: Mutex<VecDeque<Task>>,
    semaphore: Semaphore,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            semaphore: Semaphore::new(0),
        }
    }

    /// Appends `task` to the queue and signals one waiting worker.
    pub async fn submit(&self, task: Task) {
        self.queue.lock().await.push_back(task);
        self.semaphore.add_permits(1);
    }

    /// Waits for a signal, then pops the oldest task. Returns `None` if the signal was
    /// a shutdown token rather than a real submission (the queue was already empty).
    pub async fn pop(&self) -> Option<Task> {
        match self.semaphore.acquire().await {
            Ok(permit) => {
                permit.forget();
                self.queue.lock().await.pop_front()
            }
            Err(_) => None,
        }
    }

    /// Releases `n` shutdown tokens, one per worker, so every worker blocked on `pop`
    /// wakes up within one signal cycle.
    pub fn release_shutdown_tokens(&self, n: usize) {
        self.semaphore.add_permits(n);
    }

    /// Current number of pending (not yet dequeued) tasks.
    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}
