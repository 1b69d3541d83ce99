use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::{PoolError, Result};

/// A unit of work as stored in the queue.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

struct State {
    jobs: VecDeque<Job>,
    shutting_down: bool,
}

/// FIFO of pending jobs plus the shutdown flag, guarded by one mutex.
///
/// `available` is signalled once per pushed job and broadcast on shutdown.
/// Every emptiness check happens under the same lock as the push or pop it
/// decides, so a wakeup can be neither lost nor acted on stale.
pub(crate) struct WorkQueue {
    state: Mutex<State>,
    available: Condvar,
}

impl WorkQueue {
    pub(crate) fn new() -> Self {
        WorkQueue {
            state: Mutex::new(State {
                jobs: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
        }
    }

    // Jobs never run while the lock is held, so a poisoned lock still
    // guards a consistent queue.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a job and wakes one idle worker.
    pub(crate) fn push(&self, job: Job) -> Result<()> {
        {
            let mut state = self.lock();
            if state.shutting_down {
                return Err(PoolError::ShutDown);
            }
            state.jobs.push_back(job);
        }
        self.available.notify_one();
        Ok(())
    }

    /// Blocks until a job is available or shutdown is requested.
    ///
    /// Returns `None` only once shutdown has been requested and the queue is
    /// drained; queued jobs are still handed out after shutdown begins.
    pub(crate) fn pop(&self) -> Option<Job> {
        let state = self.lock();
        let mut state = self
            .available
            .wait_while(state, |state| state.jobs.is_empty() && !state.shutting_down)
            .unwrap_or_else(PoisonError::into_inner);
        state.jobs.pop_front()
    }

    /// Marks the queue as shutting down and wakes every waiting worker.
    pub(crate) fn shut_down(&self) {
        self.lock().shutting_down = true;
        self.available.notify_all();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().jobs.len()
    }
}
