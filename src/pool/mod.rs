//! Pool supervisor (C3): owns the worker set, the task queue, and the two-phase
//! start/stop lifecycle.

pub mod queue;
pub mod worker;

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use crate::clock::ClockCorrector;
use crate::config::PoolConfig;
use crate::error::pool::PoolError;
use crate::events::EventSink;
use crate::executor;
use crate::format::TaskFormatter;
use crate::task::Task;

use queue::TaskQueue;
use worker::WorkerUnit;

struct LifecycleState {
    initialized: bool,
    terminating: bool,
}

/// Coordinates a fixed-size set of [`WorkerUnit`]s against a shared [`TaskQueue`],
/// [`ClockCorrector`], and [`TaskFormatter`]. Events are published to `sink`.
pub struct Pool {
    config: PoolConfig,
    workers: Vec<Arc<WorkerUnit>>,
    queue: Arc<TaskQueue>,
    clock: Arc<ClockCorrector>,
    formatter: Arc<TaskFormatter>,
    sink: Arc<dyn EventSink>,
    shutdown: Arc<Notify>,
    lifecycle: Mutex<LifecycleState>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Pool {
    pub fn new(config: PoolConfig, sink: Arc<dyn EventSink>) -> Self {
        let affinity = config.affinity.clone();
        let workers = (0..config.max_requests)
            .map(|id| Arc::new(WorkerUnit::new(id)))
            .collect();

        Self {
            config,
            workers,
            queue: Arc::new(TaskQueue::new()),
            clock: Arc::new(ClockCorrector::new()),
            formatter: Arc::new(TaskFormatter::new(affinity)),
            sink,
            shutdown: Arc::new(Notify::new()),
            lifecycle: Mutex::new(LifecycleState {
                initialized: false,
                terminating: false,
            }),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Allocates the working loop for each worker. Idempotent when already initialized.
    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.initialized {
            return;
        }
        lifecycle.initialized = true;
        lifecycle.terminating = false;
        drop(lifecycle);

        let mut handles = self.handles.lock().await;
        for worker in &self.workers {
            let worker = worker.clone();
            let queue = self.queue.clone();
            let clock = self.clock.clone();
            let formatter = self.formatter.clone();
            let sink = self.sink.clone();
            let shutdown = self.shutdown.clone();
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                working_loop(worker, queue, clock, formatter, sink, shutdown, config).await;
            }));
        }
        tracing::info!(workers = self.workers.len(), "pool started");
    }

    /// Tears the pool down. Sets every worker's terminate flag, wakes anything waiting
    /// on the queue or the shared sleep condition, and, if `kill_abruptly`, force-stops
    /// every live child before joining the worker tasks.
    pub async fn stop(&self, kill_abruptly: bool) {
        let mut lifecycle = self.lifecycle.lock().await;
        if !lifecycle.initialized || lifecycle.terminating {
            return;
        }
        lifecycle.terminating = true;
        drop(lifecycle);

        for worker in &self.workers {
            worker.terminate().await;
        }
        self.queue.release_shutdown_tokens(self.workers.len());
        self.shutdown.notify_waiters();

        if kill_abruptly {
            for worker in &self.workers {
                worker.force_stop_process().await;
            }
        }

        let handles = std::mem::take(&mut *self.handles.lock().await);
        for (id, handle) in handles.into_iter().enumerate() {
            match tokio::time::timeout(self.config.shutdown_timeout(), handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    let err = PoolError::WorkerPanicked(id, join_err.to_string());
                    tracing::error!(worker = id, error = %err, "worker task panicked during shutdown");
                }
                Err(_elapsed) => {
                    tracing::warn!(worker = id, "worker did not join before shutdown timeout");
                }
            }
        }

        self.clock.reset_session(0.0, 0.0).await;

        let mut lifecycle = self.lifecycle.lock().await;
        lifecycle.initialized = false;
        lifecycle.terminating = false;
        tracing::info!("pool stopped");
    }

    /// Enqueues `task`. Silently dropped (with a log) if the pool is not running.
    /// Before enqueuing, sweeps for workers that died unexpectedly and replaces them.
    pub async fn submit(&self, task: Task) {
        let lifecycle = self.lifecycle.lock().await;
        if !lifecycle.initialized || lifecycle.terminating {
            tracing::warn!("task submitted to a pool that is not running, dropping");
            return;
        }
        drop(lifecycle);

        self.respawn_dead_workers().await;
        self.queue.submit(task).await;
    }

    /// Rebuilds the working-loop task for any worker whose task handle has already
    /// finished (a panic, most likely), so a crashed worker doesn't silently shrink the
    /// pool's effective concurrency.
    async fn respawn_dead_workers(&self) {
        let mut handles = self.handles.lock().await;
        for (id, handle) in handles.iter_mut().enumerate() {
            if !handle.is_finished() {
                continue;
            }
            tracing::error!(worker = id, "worker task died, respawning");

            let worker = self.workers[id].clone();
            worker.reset().await;
            let queue = self.queue.clone();
            let clock = self.clock.clone();
            let formatter = self.formatter.clone();
            let sink = self.sink.clone();
            let shutdown = self.shutdown.clone();
            let config = self.config.clone();

            *handle = tokio::spawn(async move {
                working_loop(worker, queue, clock, formatter, sink, shutdown, config).await;
            });
        }
    }

    /// Sum of `is_active()` across every worker.
    pub async fn active_tasks(&self) -> usize {
        let mut count = 0;
        for worker in &self.workers {
            if worker.is_active().await {
                count += 1;
            }
        }
        count
    }

    pub async fn get_pending_tasks(&self) -> usize {
        self.queue.len().await
    }

    /// Forwarded to the shared [`ClockCorrector`].
    pub async fn reset_session(&self, session_start_rel: f64, session_start_abs: f64) {
        self.clock
            .reset_session(session_start_rel, session_start_abs)
            .await;
    }

    pub async fn correct_time(&self, controller_workload_ts: f64) {
        self.clock.correct_time(controller_workload_ts).await;
    }
}

/// One worker's dequeue-dispatch-repeat loop.
async fn working_loop(
    worker: Arc<WorkerUnit>,
    queue: Arc<TaskQueue>,
    clock: Arc<ClockCorrector>,
    formatter: Arc<TaskFormatter>,
    sink: Arc<dyn EventSink>,
    shutdown: Arc<Notify>,
    config: PoolConfig,
) {
    loop {
        if worker.has_to_terminate().await {
            break;
        }
        let Some(task) = queue.pop().await else {
            // Either a genuine shutdown token, or a spurious wakeup on an empty queue.
            if worker.has_to_terminate().await {
                break;
            }
            continue;
        };

        // Don't re-check terminate here: a task already dequeued must reach
        // `execute_task`, whose own spawn step refuses silently if the worker is
        // terminating. Dropping it here instead would discard a live task with no event
        // at all, not even the spec-sanctioned silent exit.
        executor::execute_task(
            task,
            &worker,
            &clock,
            &formatter,
            sink.as_ref(),
            &config,
            &shutdown,
        )
        .await;
    }
}
