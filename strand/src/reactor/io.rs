use crate::error::{IoErrorCode, IoFailure};
use crate::runtime::context;

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// The operation handed to the blocking pool.
type Operation<T> = Box<dyn FnOnce() -> Result<T, IoFailure> + Send + 'static>;

/// Registration shared between a [`PerformIo`] future and its pool job.
struct IoSlot<T> {
    result: Option<Result<T, IoFailure>>,

    /// Waker of the task awaiting the result.
    waker: Option<Waker>,

    /// Set when the future was dropped; the job discards its result.
    abandoned: bool,
}

/// Future returned by [`perform_io`](crate::io::perform_io).
///
/// On first poll the operation is submitted to the runtime's blocking pool
/// and the task suspends. The pool thread stores the result and wakes the
/// task; other tasks keep running in the meantime.
///
/// Dropping the future before it resolves releases the registration: the
/// operation itself cannot be interrupted, but its result is discarded and
/// nothing is woken.
#[must_use = "futures do nothing unless awaited"]
pub struct PerformIo<T> {
    op: Option<Operation<T>>,
    slot: Option<Arc<Mutex<IoSlot<T>>>>,
}

impl<T: Send + 'static> PerformIo<T> {
    pub(crate) fn new<F>(op: F) -> Self
    where
        F: FnOnce() -> Result<T, IoFailure> + Send + 'static,
    {
        Self {
            op: Some(Box::new(op)),
            slot: None,
        }
    }

    fn submit(&mut self, op: Operation<T>, waker: &Waker) -> Result<(), IoFailure> {
        let handle = context::current().expect("perform_io polled outside of a strand runtime");

        let slot = Arc::new(Mutex::new(IoSlot {
            result: None,
            waker: Some(waker.clone()),
            abandoned: false,
        }));

        let job_slot = slot.clone();
        let job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(op)).unwrap_or_else(|_| {
                Err(IoFailure::new(IoErrorCode::Transport, "I/O operation panicked"))
            });

            let waker = {
                let mut slot = job_slot.lock().unwrap();
                if slot.abandoned {
                    return;
                }
                slot.result = Some(result);
                slot.waker.take()
            };

            if let Some(waker) = waker {
                waker.wake();
            }
        });

        handle
            .scheduler()
            .blocking()
            .spawn(job)
            .map_err(|err| IoFailure::new(IoErrorCode::Cancelled, err.to_string()))?;

        self.slot = Some(slot);
        Ok(())
    }
}

impl<T: Send + 'static> Future for PerformIo<T> {
    type Output = Result<T, IoFailure>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(op) = this.op.take() {
            if let Err(failure) = this.submit(op, cx.waker()) {
                return Poll::Ready(Err(failure));
            }
            return Poll::Pending;
        }

        let Some(slot) = this.slot.as_ref() else {
            return Poll::Ready(Err(IoFailure::new(
                IoErrorCode::Cancelled,
                "PerformIo polled after completion",
            )));
        };

        let mut slot = slot.lock().unwrap();

        match slot.result.take() {
            Some(result) => {
                drop(slot);
                this.slot = None;
                Poll::Ready(result)
            }
            None => {
                let stale = slot
                    .waker
                    .as_ref()
                    .is_none_or(|waker| !waker.will_wake(cx.waker()));

                if stale {
                    slot.waker = Some(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for PerformIo<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            let mut slot = slot.lock().unwrap();
            slot.abandoned = true;
            slot.waker = None;
            slot.result = None;
        }
    }
}
