use std::error::Error as StdError;
use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

/// Error type for pool and stream operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The requested worker count is zero or above the configured maximum.
    #[error("Invalid worker count {requested}: must be between 1 and {max}")]
    InvalidWorkerCount {
        /// The count that was asked for.
        requested: u32,
        /// The configured upper bound.
        max: u32,
    },

    /// The operating system refused to start a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    /// Work was submitted after the pool began shutting down.
    #[error("Thread pool is shut down")]
    ShutDown,

    /// IO error from stream reads.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A string block read from a stream is not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A joined task did not produce a value.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Failure of a single submitted task, reported through its `ResultHandle`.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The task panicked.
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// The task returned an error.
    #[error("Task failed: {0}")]
    Failed(Box<dyn StdError + Send + Sync + 'static>),

    /// The task was dropped before producing an outcome.
    #[error("Task was abandoned before completion")]
    Abandoned,
}

/// Result type alias for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
