//! Task-argument formatting error types.

use thiserror::Error;

/// Errors produced while shaping a task's command line into an argument vector.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The task's `args` string could not be tokenized (e.g. unbalanced quotes).
    #[error("could not parse command line into arguments: {0:?}")]
    UnparsableCommand(String),

    /// A non-script task produced an empty argument vector.
    #[error("command line has no arguments: {0:?}")]
    EmptyCommand(String),
}
