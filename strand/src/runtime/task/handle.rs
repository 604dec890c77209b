use crate::error::TaskFailure;
use crate::task::{Task, TaskId, TaskState};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// Awaiting a `JoinHandle` yields the task's outcome: `Ok` with the value
/// the body produced, or `Err` with the captured [`TaskFailure`]. The
/// outcome is moved out, so a consumed handle cannot be polled again.
/// Use [`join`](Self::join) to observe a cached outcome any number of
/// times.
///
/// Dropping the `JoinHandle` does **not** cancel the task; it only
/// discards the ability to observe its result. A failure nobody observed
/// is reported when the runtime shuts down.
pub struct JoinHandle<T> {
    pub(crate) task: Arc<Task<T>>,
}

impl<T: Send + 'static> JoinHandle<T> {
    pub(crate) fn new(task: Arc<Task<T>>) -> Self {
        Self { task }
    }

    pub fn id(&self) -> TaskId {
        self.task.id()
    }

    pub fn state(&self) -> TaskState {
        self.task.state.snapshot()
    }

    /// Returns `true` once the task is `Completed` or `Failed`.
    pub fn is_finished(&self) -> bool {
        self.task.state.is_terminal()
    }

    /// Requests cancellation of the task.
    ///
    /// A task cannot be interrupted mid-step: its body is dropped the next
    /// time the scheduler picks it up, which releases any timer or I/O
    /// registration it holds. The task then fails with
    /// [`FailureKind::Cancelled`](crate::FailureKind::Cancelled). Aborting
    /// a finished task has no effect.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Waits for the task and returns a clone of its outcome.
    ///
    /// The outcome stays cached on the task, so joining the same handle
    /// again returns the same value or failure without running anything.
    ///
    /// # Panics
    ///
    /// Panics if the outcome was already moved out by awaiting the handle
    /// itself.
    pub fn join(&self) -> Join<'_, T>
    where
        T: Clone,
    {
        Join { handle: self }
    }

    /// Polls for completion without consuming the outcome.
    pub(crate) fn poll_finished(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.task.register_waiter(cx.waker()) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }

    /// Moves the outcome out of a finished task.
    pub(crate) fn take_outcome(&self) -> Option<Result<T, TaskFailure>> {
        if !self.task.state.is_terminal() {
            return None;
        }

        let mut completion = self.task.completion.lock().unwrap();
        completion.observed = true;
        completion.outcome.take()
    }
}

impl<T: Send + 'static> Future for JoinHandle<T> {
    type Output = Result<T, TaskFailure>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.poll_finished(cx).is_pending() {
            return Poll::Pending;
        }

        let outcome = self
            .take_outcome()
            .expect("JoinHandle polled after its outcome was taken");

        Poll::Ready(outcome)
    }
}

impl<T> Drop for JoinHandle<T> {
    fn drop(&mut self) {
        self.task.detach();
    }
}

/// Future returned by [`JoinHandle::join`].
pub struct Join<'a, T> {
    handle: &'a JoinHandle<T>,
}

impl<T: Clone + Send + 'static> Future for Join<'_, T> {
    type Output = Result<T, TaskFailure>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.handle.poll_finished(cx).is_pending() {
            return Poll::Pending;
        }

        let mut completion = self.handle.task.completion.lock().unwrap();
        completion.observed = true;

        let outcome = completion
            .outcome
            .clone()
            .expect("JoinHandle::join called after the outcome was taken");

        Poll::Ready(outcome)
    }
}
