use super::SharedQueueThreadPool;
use crate::Result;

/// Upper bound on the number of worker threads a pool may be built with.
pub const MAX_WORKERS: u32 = 128;

const DEFAULT_NAME_PREFIX: &str = "pool-worker";

/// Configuration for a [`SharedQueueThreadPool`].
///
/// The worker count is validated only when [`Builder::build`] is called,
/// so an out-of-range value is reported there rather than clamped.
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) threads: u32,
    pub(crate) name_prefix: String,
    pub(crate) stack_size: Option<usize>,
}

impl Default for Builder {
    fn default() -> Self {
        let cpus = u32::try_from(num_cpus::get()).unwrap_or(MAX_WORKERS);
        Builder {
            threads: cpus.clamp(1, MAX_WORKERS),
            name_prefix: DEFAULT_NAME_PREFIX.to_owned(),
            stack_size: None,
        }
    }
}

impl Builder {
    /// Creates a builder with one worker per logical CPU.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads.
    pub fn threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the prefix of worker thread names; workers are named `{prefix}-{id}`.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the stack size, in bytes, of each worker thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Validates the configuration and starts the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidWorkerCount`](crate::PoolError::InvalidWorkerCount)
    /// if the thread count is zero or above [`MAX_WORKERS`], and
    /// [`PoolError::Spawn`](crate::PoolError::Spawn) if a worker thread
    /// could not be started. No threads are left running in either case.
    pub fn build(self) -> Result<SharedQueueThreadPool> {
        SharedQueueThreadPool::start(self)
    }
}
