//! Error types for the injectd core.
//!
//! Each concern gets its own error enum; [`Error`] aggregates them with `thiserror`'s
//! `#[from]` so call sites can propagate with `?` regardless of which layer failed.

pub mod config;
pub mod format;
pub mod pool;

use thiserror::Error;

use crate::error::{config::ConfigError, format::FormatError, pool::PoolError};

/// Top-level error type for the injectd core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Pool lifecycle error.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Task-argument formatting error.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// I/O error not otherwise classified (e.g. reading a tasks file at startup).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
