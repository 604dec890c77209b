use crate::runtime::task::Runnable;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use tracing::trace;

/// The scheduler's ready queue.
///
/// Tasks are pushed from the driver thread, from wakers fired by timers,
/// and from blocking-pool threads completing I/O. The driver pops them in
/// FIFO order and parks on the condition variable when there is nothing
/// to run.
pub(crate) struct RunQueue {
    inner: Mutex<Inner>,

    /// Wakes the parked driver.
    condvar: Condvar,
}

struct Inner {
    tasks: VecDeque<Arc<dyn Runnable>>,

    /// Set on teardown; later pushes are dropped.
    closed: bool,
}

impl RunQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tasks: VecDeque::new(),
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Enqueues a task and wakes the driver.
    ///
    /// Returns `false` if the queue is closed.
    pub(crate) fn push(&self, task: Arc<dyn Runnable>) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.closed {
                return false;
            }
            inner.tasks.push_back(task);
        }

        self.condvar.notify_one();
        true
    }

    pub(crate) fn pop(&self) -> Option<Arc<dyn Runnable>> {
        self.inner.lock().unwrap().tasks.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().tasks.len()
    }

    /// Wakes the driver without enqueuing anything.
    ///
    /// Takes the lock so a driver about to park cannot miss the signal.
    pub(crate) fn unpark(&self) {
        let _inner = self.inner.lock().unwrap();
        self.condvar.notify_all();
    }

    /// Parks the driver until a task is queued, `notified` is raised, or
    /// `deadline` passes.
    ///
    /// Returns immediately if there is already something to do. Spurious
    /// returns are possible; the driver re-checks its state every time.
    pub(crate) fn park(&self, notified: Option<&AtomicBool>, deadline: Option<Instant>) {
        let inner = self.inner.lock().unwrap();

        let raised = notified.is_some_and(|flag| flag.load(Ordering::Acquire));
        if !inner.tasks.is_empty() || inner.closed || raised {
            return;
        }

        match deadline {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if timeout.is_zero() {
                    return;
                }

                trace!(?timeout, "driver parked");
                drop(self.condvar.wait_timeout(inner, timeout).unwrap());
            }
            None => {
                trace!("driver parked");
                drop(self.condvar.wait(inner).unwrap());
            }
        }
    }

    /// Closes the queue and returns whatever was still waiting in it.
    pub(crate) fn close(&self) -> Vec<Arc<dyn Runnable>> {
        let drained = {
            let mut inner = self.inner.lock().unwrap();
            inner.closed = true;
            inner.tasks.drain(..).collect()
        };

        self.condvar.notify_all();
        drained
    }
}
