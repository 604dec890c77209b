use crate::runtime::task::Task;

use std::sync::Arc;
use std::task::{Wake, Waker};

impl<T: Send + 'static> Wake for Task<T> {
    fn wake(self: Arc<Self>) {
        self.notify();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.clone().notify();
    }
}

/// Creates a [`Waker`] that reschedules `task` when woken.
///
/// Every clone of the waker keeps the task alive; the task is only
/// re-queued if it is currently suspended or running.
pub(crate) fn make_waker<T: Send + 'static>(task: Arc<Task<T>>) -> Waker {
    Waker::from(task)
}
