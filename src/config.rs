//! Pool configuration.

use std::time::Duration;

use crate::error::{config::ConfigError, Error};
use crate::format::AffinityConfig;

/// Default pool size when `max_requests` is unset or non-positive.
const DEFAULT_MAX_REQUESTS: usize = 20;

/// Configuration for the pool supervisor and scheduled executor.
///
/// # Environment Variables
/// - `INJECTD_MAX_REQUESTS` - pool size (non-positive or unparsable falls back to 20)
/// - `INJECTD_SKIP_EXPIRED` - `"true"`/`"false"`, default `true`
/// - `INJECTD_RETRY_TASKS` - `"true"`/`"false"`, default `true`
/// - `INJECTD_RETRY_ON_ERROR` - `"true"`/`"false"`, default `false`
/// - `INJECTD_LOG_OUTPUTS` - `"true"`/`"false"`, default `true`
/// - `INJECTD_ROOT` - `"true"`/`"false"`, default `false`
/// - `INJECTD_FAULT_CORES`, `INJECTD_BENCH_CORES` - optional NUMA core selectors
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker units in the pool.
    pub max_requests: usize,
    /// Drop tasks whose start time has already passed instead of running them late.
    pub skip_expired: bool,
    /// Respawn a task's subprocess if it exits before its duration budget is spent.
    pub retry_tasks: bool,
    /// When `retry_tasks` is set, also respawn after a nonzero early exit.
    pub retry_on_error: bool,
    /// Capture stdout/stderr for benchmark tasks and attach it to terminal events.
    pub log_outputs: bool,
    /// Permit tasks that request privilege elevation.
    pub root: bool,
    /// Pool-wide CPU-affinity policy.
    pub affinity: AffinityConfig,
    /// How long to wait for a worker's task to join during shutdown before logging a
    /// warning and moving on.
    pub shutdown_timeout_secs: u64,
}

impl PoolConfig {
    /// Pool configuration with the defaults the source implementation uses.
    pub fn new(max_requests: usize) -> Self {
        let max_requests = if max_requests > 0 {
            max_requests
        } else {
            DEFAULT_MAX_REQUESTS
        };

        Self {
            max_requests,
            skip_expired: true,
            retry_tasks: true,
            retry_on_error: false,
            log_outputs: true,
            root: false,
            affinity: AffinityConfig::default(),
            shutdown_timeout_secs: 5,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Loads configuration from `INJECTD_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new(Self::env_usize("INJECTD_MAX_REQUESTS", DEFAULT_MAX_REQUESTS)?);

        config.skip_expired = Self::env_bool("INJECTD_SKIP_EXPIRED", config.skip_expired)?;
        config.retry_tasks = Self::env_bool("INJECTD_RETRY_TASKS", config.retry_tasks)?;
        config.retry_on_error = Self::env_bool("INJECTD_RETRY_ON_ERROR", config.retry_on_error)?;
        config.log_outputs = Self::env_bool("INJECTD_LOG_OUTPUTS", config.log_outputs)?;
        config.root = Self::env_bool("INJECTD_ROOT", config.root)?;
        config.affinity.fault_cores = std::env::var("INJECTD_FAULT_CORES").ok();
        config.affinity.bench_cores = std::env::var("INJECTD_BENCH_CORES").ok();

        Ok(config)
    }

    fn env_usize(var: &str, default: usize) -> Result<usize, Error> {
        match std::env::var(var) {
            Ok(value) => value
                .parse()
                .map_err(|e| {
                    Error::from(ConfigError::InvalidEnvValue {
                        var: var.to_string(),
                        reason: format!("must be a valid number: {e}"),
                    })
                }),
            Err(_) => Ok(default),
        }
    }

    fn env_bool(var: &str, default: bool) -> Result<bool, Error> {
        match std::env::var(var) {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(Error::from(ConfigError::InvalidEnvValue {
                    var: var.to_string(),
                    reason: format!("must be true/false, got {value:?}"),
                })),
            },
            Err(_) => Ok(default),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS)
    }
}
