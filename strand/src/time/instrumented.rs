use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Wraps a future and measures the time it takes to complete.
///
/// The returned future resolves to the output of the wrapped future and
/// the time elapsed since its **first poll**, which is when a spawned task
/// actually starts running rather than when it was created.
///
/// # Examples
///
/// ```rust,ignore
/// let (page, elapsed) = instrumented(fetch(url)).await;
/// println!("{url}: {:.2}s", elapsed.as_secs_f64());
/// ```
pub fn instrumented<F: Future>(future: F) -> Instrumented<F> {
    Instrumented {
        future,
        start: None,
    }
}

/// Future returned by [`instrumented`].
#[must_use = "futures do nothing unless awaited"]
pub struct Instrumented<F> {
    future: F,
    start: Option<Instant>,
}

impl<F: Future> Future for Instrumented<F> {
    type Output = (F::Output, Duration);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `future` is never moved out of the pinned wrapper.
        let this = unsafe { self.get_unchecked_mut() };

        let start = *this.start.get_or_insert_with(Instant::now);

        match unsafe { Pin::new_unchecked(&mut this.future) }.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(output) => Poll::Ready((output, start.elapsed())),
        }
    }
}
