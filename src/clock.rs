//! Workload-clock correction (C5).
//!
//! Maintains the mapping between local wall time and the controller's workload
//! (relative) clock, and smooths out drift reported by periodic controller heartbeats.

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

/// Drift magnitude, in seconds, above which a correction is applied.
const CORRECTION_THRESHOLD: f64 = 60.0;

/// Proportional gain applied to observed drift on each `correct_time` call.
const CORRECTION_GAIN: f64 = 0.1;

pub(crate) fn wall_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs_f64()
}

#[derive(Debug, Clone, Copy, Default)]
struct ClockState {
    session_start_rel: f64,
    session_start_abs: f64,
    correction_factor: f64,
}

/// Tracks a single workload-time session and the adaptive correction factor that keeps
/// it aligned with a remote controller's clock.
pub struct ClockCorrector {
    state: Mutex<ClockState>,
}

impl ClockCorrector {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClockState::default()),
        }
    }

    /// Sets both session origins. `correction_factor` is intentionally left untouched
    /// so a mid-run reconfiguration preserves drift history.
    pub async fn reset_session(&self, session_start_rel: f64, session_start_abs: f64) {
        let mut state = self.state.lock().await;
        state.session_start_rel = session_start_rel;
        state.session_start_abs = session_start_abs;
    }

    /// Applies the proportional drift-correction filter against a controller-reported
    /// workload timestamp.
    pub async fn correct_time(&self, controller_workload_ts: f64) {
        let mut state = self.state.lock().await;
        let my_ts = wall_now() - state.session_start_abs + state.session_start_rel;
        let diff = controller_workload_ts - my_ts - state.correction_factor;

        if diff.abs() > CORRECTION_THRESHOLD && state.session_start_abs > 0.0 {
            tracing::warn!(
                drift_secs = diff,
                "clock is drifting against the controller's clock"
            );
            state.correction_factor += CORRECTION_GAIN * diff;
        }
    }

    /// Translates a wall-clock reading (seconds since the epoch) into workload time.
    pub async fn to_workload_time(&self, wall_ts: f64) -> f64 {
        let state = self.state.lock().await;
        state.session_start_rel + (wall_ts - state.session_start_abs + state.correction_factor)
    }

    /// Seconds remaining until `task_timestamp` is due, in workload time. Negative once
    /// the timestamp has passed.
    pub async fn time_to_task(&self, task_timestamp: f64) -> f64 {
        task_timestamp - self.to_workload_time(wall_now()).await
    }

    /// `true` once a session origin has been established by [`Self::reset_session`].
    pub async fn session_active(&self) -> bool {
        self.state.lock().await.session_start_abs > 0.0
    }

    /// Current accumulated correction factor, in workload-seconds.
    pub async fn correction_factor(&self) -> f64 {
        self.state.lock().await.correction_factor
    }
}

impl Default for ClockCorrector {
    fn default() -> Self {
        Self::new()
    }
}
