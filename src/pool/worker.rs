//! Worker unit (C1): one unit of concurrent execution, owning at most one live
//! subprocess at a time.

use tokio::sync::Mutex;

use crate::process::{terminate_pid, ChildProcess};
use crate::task::PRIVILEGE_SENTINEL;

struct WorkerState {
    pid: Option<u32>,
    terminate: bool,
}

/// Guards `{live_process, terminate_flag}` behind a single mutex, so a worker spawning
/// a child, the supervisor killing it on shutdown, and external liveness queries never
/// race each other.
pub struct WorkerUnit {
    id: usize,
    state: Mutex<WorkerState>,
}

impl WorkerUnit {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            state: Mutex::new(WorkerState {
                pid: None,
                terminate: false,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Flags this worker for termination. It will not spawn any further children.
    pub async fn terminate(&self) {
        self.state.lock().await.terminate = true;
    }

    pub async fn has_to_terminate(&self) -> bool {
        self.state.lock().await.terminate
    }

    /// `true` iff a child is currently recorded as live. Cleared by [`Self::clear_pid`]
    /// once the owning executor has reaped the child's exit code.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.pid.is_some()
    }

    /// Spawns `argv`, refusing if this worker is terminating or the command requests
    /// privilege elevation that isn't permitted. Returns the spawned process, whose
    /// ownership belongs to the caller for the rest of its supervised lifetime.
    pub async fn start_process(
        &self,
        argv: &[String],
        shell: bool,
        allow_privileged: bool,
    ) -> Option<ChildProcess> {
        let mut state = self.state.lock().await;
        if state.terminate {
            return None;
        }
        if !allow_privileged && argv.iter().any(|arg| arg == PRIVILEGE_SENTINEL) {
            return None;
        }

        match ChildProcess::spawn(argv, shell) {
            Ok(child) => {
                state.pid = child.pid();
                Some(child)
            }
            Err(e) => {
                tracing::error!(worker = self.id, error = %e, "failed to spawn task process");
                state.pid = None;
                None
            }
        }
    }

    /// Records that the previously spawned child has been reaped. Must be called once
    /// the owning executor has observed the child's exit (including between restart
    /// legs, before a fresh child is spawned).
    pub async fn clear_pid(&self) {
        self.state.lock().await.pid = None;
    }

    /// Clears stale `{pid, terminate}` state left behind by a task that panicked mid-run,
    /// so the supervisor can safely respawn this worker's loop from scratch.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.pid = None;
        state.terminate = false;
    }

    /// Sends a termination signal to the live child, if any. Idempotent and safe to
    /// call when no process is live. Does not wait for the exit — the executor that is
    /// already waiting on the child will observe it and call [`Self::clear_pid`].
    pub async fn force_stop_process(&self) {
        let pid = self.state.lock().await.pid;
        if let Some(pid) = pid {
            if let Err(e) = terminate_pid(pid) {
                tracing::warn!(worker = self.id, pid, error = %e, "failed to signal task process");
            }
        }
    }
}
