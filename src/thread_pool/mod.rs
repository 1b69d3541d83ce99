//! A fixed-size worker thread pool.
//!
//! [`SharedQueueThreadPool`] runs submitted closures on a fixed set of
//! worker threads that share one FIFO queue. Each submission returns a
//! [`ResultHandle`] from which the caller later takes the closure's value,
//! or the [`TaskError`](crate::TaskError) describing how it failed.

mod config;
mod handle;
mod queue;
mod shared_queue;

pub use self::config::{Builder, MAX_WORKERS};
pub use self::handle::{ResultHandle, TaskResult};
pub use self::shared_queue::SharedQueueThreadPool;
