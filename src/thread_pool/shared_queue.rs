use std::error::Error as StdError;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info};

use super::config::{Builder, MAX_WORKERS};
use super::handle::{self, ResultHandle};
use super::queue::WorkQueue;
use crate::{PoolError, Result, TaskError};

/// State shared between the pool and its workers.
struct Shared {
    queue: WorkQueue,
    live: AtomicUsize,
}

/// A fixed-size thread pool using a single shared job queue.
///
/// Workers pull jobs from one FIFO queue guarded by a mutex and a condition
/// variable. Each submission wakes a single idle worker; shutdown wakes all
/// of them. A job that panics or fails is reported through its
/// [`ResultHandle`] and the worker moves on to the next job.
///
/// Dropping the pool shuts it down: jobs already queued still run, and the
/// drop blocks until every worker has been joined.
pub struct SharedQueueThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    threads: u32,
}

impl SharedQueueThreadPool {
    /// Creates a pool with exactly `threads` workers and default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads` is zero or above [`MAX_WORKERS`], or if
    /// a worker thread could not be spawned.
    pub fn new(threads: u32) -> Result<Self> {
        Builder::new().threads(threads).build()
    }

    /// Returns a builder for configuring a pool.
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn start(builder: Builder) -> Result<Self> {
        let threads = builder.threads;
        if !(1..=MAX_WORKERS).contains(&threads) {
            error!("Bad pool size: {threads}");
            return Err(PoolError::InvalidWorkerCount {
                requested: threads,
                max: MAX_WORKERS,
            });
        }

        info!("Starting {threads} worker threads");
        let mut pool = SharedQueueThreadPool {
            shared: Arc::new(Shared {
                queue: WorkQueue::new(),
                live: AtomicUsize::new(0),
            }),
            workers: Vec::with_capacity(threads as usize),
            threads,
        };

        for id in 0..threads {
            match spawn_worker(id, &pool.shared, &builder) {
                Ok(worker) => pool.workers.push(worker),
                Err(e) => {
                    error!("Failed to spawn worker {id}: {e}");
                    // Dropping the pool joins the workers started so far.
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        Ok(pool)
    }

    /// Submits a task and returns a handle to its result.
    ///
    /// If the task panics, the handle reports [`TaskError::Panicked`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] if the pool has been shut down.
    pub fn submit<F, T>(&self, task: F) -> Result<ResultHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = handle::package(move || Ok(task()));
        self.shared.queue.push(job)?;
        Ok(handle)
    }

    /// Submits a task that may fail; an `Err` it returns is reported by the
    /// handle as [`TaskError::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] if the pool has been shut down.
    pub fn submit_fallible<F, T, E>(&self, task: F) -> Result<ResultHandle<T>>
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Into<Box<dyn StdError + Send + Sync + 'static>>,
    {
        let (job, handle) =
            handle::package(move || task().map_err(|e| TaskError::Failed(e.into())));
        self.shared.queue.push(job)?;
        Ok(handle)
    }

    /// Spawns a job whose outcome is not observed.
    ///
    /// A panic in the job is logged and the worker continues.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] if the pool has been shut down.
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.push(Box::new(job))
    }

    /// Number of workers the pool was built with.
    pub fn threads(&self) -> u32 {
        self.threads
    }

    /// Number of worker threads launched and not yet exited.
    pub fn live_workers(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    /// Number of jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Stops accepting work, lets queued jobs drain, and joins every worker.
    ///
    /// Later submissions fail with [`PoolError::ShutDown`]. Calling this
    /// more than once has no further effect; dropping the pool calls it.
    pub fn shutdown(&mut self) {
        self.shared.queue.shut_down();
        if self.workers.is_empty() {
            return;
        }

        info!("Joining {} worker threads", self.workers.len());
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("<unnamed>").to_owned();
            if worker.join().is_err() {
                error!("Worker {name} terminated abnormally");
            }
        }
        info!("All worker threads joined");
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Counts a worker as live from before its thread is spawned until the
/// thread exits, or until the spawn fails and the closure is dropped.
struct LiveWorker(Arc<Shared>);

impl LiveWorker {
    fn register(shared: &Arc<Shared>) -> Self {
        shared.live.fetch_add(1, Ordering::SeqCst);
        LiveWorker(Arc::clone(shared))
    }

    fn queue(&self) -> &WorkQueue {
        &self.0.queue
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        self.0.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawns a single worker thread that pulls jobs until the queue is shut
/// down and empty.
fn spawn_worker(id: u32, shared: &Arc<Shared>, config: &Builder) -> io::Result<JoinHandle<()>> {
    let mut builder = thread::Builder::new().name(format!("{}-{id}", config.name_prefix));
    if let Some(size) = config.stack_size {
        builder = builder.stack_size(size);
    }

    let worker = LiveWorker::register(shared);
    builder.spawn(move || {
        debug!("Worker {id} started");
        while let Some(job) = worker.queue().pop() {
            debug!("Worker {id} executing job");
            // Catch panics so the worker loop continues
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("Worker {id} job panicked, continuing");
            }
        }
        debug!("Worker {id}: queue shut down and empty, exiting");
    })
}
