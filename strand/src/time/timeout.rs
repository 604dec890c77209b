use crate::error::Elapsed;
use crate::time::sleep::{Sleep, sleep};

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Requires a future to complete before `duration` has elapsed.
///
/// The wrapped future is polled first, so a future that is ready at the
/// deadline still wins. On expiry the future is dropped, which cancels
/// whatever it was waiting on.
///
/// # Examples
///
/// ```rust,ignore
/// match timeout(Duration::from_secs(1), fetch()).await {
///     Ok(page) => render(page),
///     Err(_) => println!("too slow"),
/// }
/// ```
pub fn timeout<F>(duration: Duration, future: F) -> Timeout<F>
where
    F: Future,
{
    Timeout {
        future,
        sleep: sleep(duration),
    }
}

/// Future returned by [`timeout`].
#[must_use = "futures do nothing unless awaited"]
pub struct Timeout<F> {
    future: F,
    sleep: Sleep,
}

impl<F> Future for Timeout<F>
where
    F: Future,
{
    type Output = Result<F::Output, Elapsed>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `future` is never moved out of the pinned `Timeout`.
        let this = unsafe { self.get_unchecked_mut() };

        let future = unsafe { Pin::new_unchecked(&mut this.future) };
        if let Poll::Ready(val) = future.poll(cx) {
            return Poll::Ready(Ok(val));
        }

        if let Poll::Ready(()) = Pin::new(&mut this.sleep).poll(cx) {
            return Poll::Ready(Err(Elapsed::new()));
        }

        Poll::Pending
    }
}
