//! The `Task` record and the sentinel values that govern how it is scheduled.

use serde::{Deserialize, Serialize};

/// `duration` value meaning "no limit" — the child runs until it exits on its own.
pub const DURATION_NO_LIMIT: f64 = 0.0;

/// `cores` value meaning "yield to whatever the task itself requested".
pub const CORES_ALL: &str = "all";

/// Argv token that marks a command as requesting privilege elevation.
pub const PRIVILEGE_SENTINEL: &str = "sudo";

/// One command to execute under pool supervision.
///
/// `timestamp` starts as the scheduled start time and is overwritten by the executor
/// to carry the actual start / restart / end time of each emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Command line, shell syntax. May be a path to a shell script.
    pub args: String,
    /// Expected run duration in seconds, or [`DURATION_NO_LIMIT`].
    pub duration: f64,
    /// Scheduled start time on the workload's relative-time axis.
    pub timestamp: f64,
    /// Distinguishes fault-injection tasks from benchmark tasks.
    pub is_fault: bool,
    /// Optional CPU-affinity selector, in the host's affinity syntax. May be
    /// overridden by pool-wide policy (see `TaskFormatter`).
    pub cores: Option<String>,
}

impl Task {
    /// True when `duration` carries the no-limit sentinel.
    pub fn has_no_duration_limit(&self) -> bool {
        self.duration == DURATION_NO_LIMIT
    }
}
