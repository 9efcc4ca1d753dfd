//! Lifecycle events emitted by the scheduled executor, and the sink that broadcasts them.
//!
//! The wire encoding and transport that ultimately deliver these to a controller are
//! external collaborators; this module only models the event shapes and an in-process
//! fan-out sink, mirroring how a message-entity/message-builder pair would be consumed.

use tokio::sync::broadcast;

use crate::task::Task;

/// One lifecycle transition for a single task.
#[derive(Debug, Clone)]
pub enum Event {
    /// The task's subprocess was spawned.
    Start {
        task: Task,
        /// Actual spawn time, translated into workload time.
        timestamp: f64,
    },
    /// The task's subprocess exited early and was respawned.
    Restart {
        task: Task,
        timestamp: f64,
        /// Exit code of the leg that just ended, `None` if it exited cleanly.
        prior_exit_code: Option<i32>,
    },
    /// The task finished with a zero exit code (or was killed at its deadline).
    End {
        task: Task,
        timestamp: f64,
        output: Option<String>,
    },
    /// The task finished with a nonzero exit code, or never spawned.
    Error {
        task: Task,
        timestamp: f64,
        exit_code: i32,
        output: Option<String>,
    },
}

/// Thread-safe broadcast target for task lifecycle events.
///
/// Analogous to the consumed "message entity" contract: `emit` must be safe to call
/// concurrently from every worker.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// An [`EventSink`] backed by a [`tokio::sync::broadcast`] channel.
///
/// Subscribers that lag behind the channel capacity miss the oldest events rather than
/// block a worker's publish — matching "there is no retry for event delivery: if the
/// broadcast collaborator drops a message, it is lost".
#[derive(Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<Event>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: Event) {
        // No subscribers is a normal state (e.g. during tests); a send error here just
        // means nobody was listening.
        let _ = self.tx.send(event);
    }
}

/// An [`EventSink`] that discards every event. Useful for standalone runs with no
/// controller attached.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: Event) {}
}
