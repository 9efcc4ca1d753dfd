//! `injectd`: a scheduled subprocess execution pool for distributed fault-injection and
//! benchmark workloads.
//!
//! A [`pool::Pool`] owns a fixed set of workers ([`pool::worker::WorkerUnit`]) pulling
//! from a shared [`pool::queue::TaskQueue`]. Each dequeued [`task::Task`] is driven
//! through [`executor::execute_task`], which consults a [`clock::ClockCorrector`] for
//! scheduling and a [`format::TaskFormatter`] for command shaping, and publishes
//! lifecycle [`events::Event`]s to an [`events::EventSink`].

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod format;
pub mod pool;
pub mod process;
pub mod task;

pub use config::PoolConfig;
pub use error::Error;
pub use events::{BroadcastEventSink, Event, EventSink, NullEventSink};
pub use pool::Pool;
pub use task::Task;
