use super::Runtime;
use super::core::Config;
use crate::error::BuildError;

use std::thread;
use std::time::Duration;

/// Upper bound accepted for [`RuntimeBuilder::blocking_threads`].
pub const MAX_BLOCKING_THREADS: usize = 512;

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(10);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_millis(100);
const DEFAULT_THREAD_NAME: &str = "strand-blocking";

/// Builder for configuring and creating a runtime.
///
/// `RuntimeBuilder` allows customizing runtime parameters before
/// constructing the runtime. Tasks always run on the thread driving the
/// runtime; the settings below size the pool that runs blocking I/O and
/// bound how long teardown waits for abandoned work.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .blocking_threads(4)
///     .shutdown_grace(Duration::from_millis(250))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct RuntimeBuilder {
    /// Maximum number of threads running blocking operations.
    blocking_threads: usize,

    /// Idle time after which a blocking thread exits.
    blocking_keep_alive: Duration,

    /// How long teardown keeps driving live tasks.
    shutdown_grace: Duration,

    /// Name prefix of blocking threads.
    thread_name: String,
}

impl RuntimeBuilder {
    /// Creates a new `RuntimeBuilder` with default configuration.
    ///
    /// By default, the number of blocking threads is set to the number
    /// of available logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let blocking_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            blocking_threads,
            blocking_keep_alive: DEFAULT_KEEP_ALIVE,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }

    /// Sets the maximum number of threads running blocking operations.
    ///
    /// Operations submitted while every thread is busy wait in a queue.
    /// Validated by [`build`](Self::build).
    pub fn blocking_threads(mut self, n: usize) -> Self {
        self.blocking_threads = n;
        self
    }

    /// Sets how long an idle blocking thread is kept before exiting.
    pub fn blocking_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.blocking_keep_alive = keep_alive;
        self
    }

    /// Sets how long teardown keeps driving live tasks before failing
    /// them with `Shutdown`.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Sets the name prefix of blocking threads.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Builds the runtime with the configured options.
    ///
    /// No thread is started here: blocking threads are spawned on demand.
    pub fn build(self) -> Result<Runtime, BuildError> {
        if self.blocking_threads == 0 || self.blocking_threads > MAX_BLOCKING_THREADS {
            return Err(BuildError::BlockingThreads {
                got: self.blocking_threads,
                max: MAX_BLOCKING_THREADS,
            });
        }

        if self.thread_name.is_empty() {
            return Err(BuildError::EmptyThreadName);
        }

        Ok(Runtime::new(Config {
            blocking_threads: self.blocking_threads,
            blocking_keep_alive: self.blocking_keep_alive,
            shutdown_grace: self.shutdown_grace,
            thread_name: self.thread_name,
        }))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let builder = RuntimeBuilder::new();

        assert!(builder.blocking_threads >= 1);
        assert_eq!(builder.shutdown_grace, Duration::from_millis(100));
        assert_eq!(builder.thread_name, "strand-blocking");
        assert!(builder.build().is_ok());
    }

    #[test]
    fn zero_blocking_threads_is_rejected() {
        let err = RuntimeBuilder::new().blocking_threads(0).build().err();

        assert_eq!(err, Some(BuildError::BlockingThreads { got: 0, max: 512 }));
    }

    #[test]
    fn too_many_blocking_threads_is_rejected() {
        let result = RuntimeBuilder::new()
            .blocking_threads(MAX_BLOCKING_THREADS + 1)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::BlockingThreads { got: 513, .. })
        ));
    }

    #[test]
    fn empty_thread_name_is_rejected() {
        let err = RuntimeBuilder::new().thread_name("").build().err();

        assert_eq!(err, Some(BuildError::EmptyThreadName));
    }
}
