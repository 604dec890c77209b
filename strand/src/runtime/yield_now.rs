use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future returned by [`yield_now`].
#[must_use = "futures do nothing unless awaited"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }

        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Suspends the current task once, letting every other ready task run
/// before it resumes.
///
/// Tasks are never preempted; a long computation that wants to share the
/// scheduler has to call this (or another suspension point) explicitly.
///
/// # Examples
///
/// ```rust,ignore
/// for chunk in work.chunks(64) {
///     process(chunk);
///     yield_now().await;
/// }
/// ```
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}
