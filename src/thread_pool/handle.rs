use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};

use super::queue::Job;
use crate::TaskError;

/// Outcome of a task as seen through its [`ResultHandle`].
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Handle to the eventual outcome of a submitted task.
///
/// The worker that runs the task writes its outcome exactly once; the
/// handle reads it. Dropping the handle does not cancel the task.
#[derive(Debug)]
pub struct ResultHandle<T> {
    slot: Receiver<TaskResult<T>>,
}

impl<T> ResultHandle<T> {
    /// Blocks until the task has run and returns its outcome.
    pub fn join(self) -> TaskResult<T> {
        self.slot.recv().unwrap_or(Err(TaskError::Abandoned))
    }

    /// Like [`join`](Self::join), but gives the handle back if the task has
    /// not finished within `timeout`.
    pub fn join_timeout(self, timeout: Duration) -> Result<TaskResult<T>, Self> {
        match self.slot.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(self),
            Err(RecvTimeoutError::Disconnected) => Ok(Err(TaskError::Abandoned)),
        }
    }

    /// Returns `true` once the task has run and its outcome is waiting.
    ///
    /// Stays `false` for a task dropped without running, even though
    /// [`join`](Self::join) then returns [`TaskError::Abandoned`] at once.
    pub fn is_finished(&self) -> bool {
        !self.slot.is_empty()
    }
}

/// Wraps `task` into a queue job paired with the handle that observes it.
///
/// Panics inside `task` are caught here and reported as
/// [`TaskError::Panicked`], so they never reach the worker.
pub(crate) fn package<F, T>(task: F) -> (Job, ResultHandle<T>)
where
    F: FnOnce() -> TaskResult<T> + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    let job: Job = Box::new(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
            Err(TaskError::Panicked(panic_message(payload.as_ref())))
        });
        // The handle may already be gone.
        let _ = tx.send(outcome);
    });
    (job, ResultHandle { slot: rx })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
