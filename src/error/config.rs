//! Configuration error types.

use thiserror::Error;

/// Errors produced while loading [`crate::config::PoolConfig`] from the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable value is invalid or malformed.
    #[error("Invalid value for environment variable {var}: {reason}")]
    InvalidEnvValue { var: String, reason: String },
}
