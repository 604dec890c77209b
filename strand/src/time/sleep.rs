use crate::reactor::TimerKey;
use crate::runtime::Scheduler;
use crate::runtime::context;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// The deadline is fixed when `sleep` is called; the timer is registered
/// with the current runtime on first poll. The future never completes
/// before the deadline, and sleeping tasks do not hold up each other:
/// N tasks sleeping for D each all resume roughly D after they started.
///
/// # Panics
///
/// Panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    sleep_until(Instant::now() + duration)
}

/// Creates a future that completes after `millis` milliseconds.
pub fn sleep_ms(millis: u64) -> Sleep {
    sleep(Duration::from_millis(millis))
}

/// Creates a future that completes once `deadline` is reached.
pub fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        entry: None,
    }
}

/// A future that completes once a specific deadline is reached.
///
/// This future is **cancel-safe**: dropping it removes its entry from the
/// timer queue, so an abandoned sleep never wakes its task.
#[must_use = "futures do nothing unless awaited"]
pub struct Sleep {
    /// Absolute point in time when the sleep completes.
    deadline: Instant,

    /// Timer registration, once polled.
    entry: Option<(Arc<Scheduler>, TimerKey)>,
}

impl Sleep {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    fn deregister(&mut self) {
        if let Some((scheduler, key)) = self.entry.take() {
            scheduler.timers().remove(key);
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.is_elapsed() {
            this.deregister();
            return Poll::Ready(());
        }

        match &this.entry {
            Some((scheduler, key)) => {
                let mut timers = scheduler.timers();

                // Cleared by teardown; register again so the wake-up is not lost.
                if !timers.set_waker(*key, cx.waker()) {
                    let key = timers.insert(this.deadline, cx.waker().clone());
                    drop(timers);

                    let scheduler = scheduler.clone();
                    this.entry = Some((scheduler, key));
                }
            }
            None => {
                let handle = context::current().expect("Sleep polled outside of a strand runtime");
                let scheduler = handle.scheduler().clone();
                let key = scheduler.timers().insert(this.deadline, cx.waker().clone());

                this.entry = Some((scheduler, key));
            }
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.deregister();
    }
}
