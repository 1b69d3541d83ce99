#![deny(missing_docs)]

//! A fixed-size worker thread pool with per-task result handles.
//!
//! Tasks are queued in submission order and run on long-lived worker
//! threads. A task that fails or panics is reported through its own
//! handle and never takes a worker down with it. Dropping the pool
//! drains the queue and joins every worker.

mod error;
/// Big-endian byte stream reading.
pub mod stream;
/// The worker thread pool.
pub mod thread_pool;

pub use error::{PoolError, Result, TaskError};
pub use stream::ByteReader;
pub use thread_pool::{Builder, ResultHandle, SharedQueueThreadPool, TaskResult, MAX_WORKERS};
