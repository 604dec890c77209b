use super::Scheduler;
use crate::runtime::{Handle, context};

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Wake, Waker};
use std::time::Instant;

use tracing::trace;

/// Waker of the future passed to `block_on`.
///
/// The root future is not a task: it lives on the caller's stack and is
/// polled by the driver loop whenever this flag is raised.
struct RootWaker {
    notified: AtomicBool,
    scheduler: Arc<Scheduler>,
}

impl Wake for RootWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        if !self.notified.swap(true, Ordering::AcqRel) {
            self.scheduler.queue().unpark();
        }
    }
}

/// Drives the scheduler on the calling thread until `future` resolves.
///
/// # Panics
///
/// Panics if the calling thread is already driving a runtime.
pub(crate) fn block_on<F: Future>(handle: &Handle, future: F) -> F::Output {
    assert!(
        !context::is_entered(),
        "cannot block on a future from within a strand runtime"
    );

    let scheduler = handle.scheduler();
    let _driver = scheduler.lock_driver();
    let _enter = context::enter(handle.clone());

    let root = Arc::new(RootWaker {
        notified: AtomicBool::new(true),
        scheduler: scheduler.clone(),
    });
    let waker = Waker::from(root.clone());
    let mut cx = Context::from_waker(&waker);

    let mut future = pin!(future);

    loop {
        if root.notified.swap(false, Ordering::AcqRel) {
            trace!("polling root future");
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
        }

        scheduler.tick();

        scheduler.park(Some(&root.notified), None);
    }
}

/// Drives the scheduler until no live task remains or `deadline` passes.
///
/// Returns `true` if every task reached a terminal state.
pub(crate) fn run_until_idle(handle: &Handle, deadline: Option<Instant>) -> bool {
    let scheduler = handle.scheduler();
    let _driver = scheduler.lock_driver();
    let _enter = context::enter(handle.clone());

    loop {
        scheduler.tick();

        if scheduler.live() == 0 {
            return true;
        }

        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return false;
        }

        scheduler.park(None, deadline);
    }
}
