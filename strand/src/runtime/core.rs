use super::Handle;
use super::executor::{Scheduler, driver};
use crate::error::TaskFailure;
use crate::reactor::BlockingPool;
use crate::runtime::context;
use crate::task::JoinHandle;

use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

/// Settings resolved by [`RuntimeBuilder`](crate::RuntimeBuilder).
pub(crate) struct Config {
    pub(crate) blocking_threads: usize,
    pub(crate) blocking_keep_alive: Duration,
    pub(crate) shutdown_grace: Duration,
    pub(crate) thread_name: String,
}

/// The main runtime handle.
///
/// `Runtime` is responsible for:
/// - spawning asynchronous tasks,
/// - driving task execution on the thread calling
///   [`block_on`](Self::block_on),
/// - running blocking I/O on its own thread pool,
/// - tearing down abandoned tasks within a bounded grace period.
///
/// Dropping the runtime performs the same teardown as
/// [`shutdown`](Self::shutdown) and logs failures nobody observed.
pub struct Runtime {
    handle: Handle,

    /// How long teardown keeps driving live tasks before aborting them.
    shutdown_grace: Duration,

    torn_down: bool,
}

/// Outcome of a runtime teardown.
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// `true` if every task finished on its own within the grace period.
    pub drained: bool,

    /// Tasks moved to `Failed(Shutdown)` because they were still live.
    pub aborted: usize,

    /// Failures of tasks whose handles were dropped without awaiting them.
    pub unobserved: Vec<TaskFailure>,
}

impl ShutdownReport {
    /// Returns `true` if nothing was aborted and no failure went unseen.
    pub fn is_clean(&self) -> bool {
        self.drained && self.aborted == 0 && self.unobserved.is_empty()
    }
}

impl Runtime {
    pub(crate) fn new(config: Config) -> Self {
        let blocking = BlockingPool::new(
            config.blocking_threads,
            config.blocking_keep_alive,
            config.thread_name,
        );
        let scheduler = Arc::new(Scheduler::new(blocking));

        debug!(
            blocking_threads = config.blocking_threads,
            shutdown_grace = ?config.shutdown_grace,
            "runtime started"
        );

        Self {
            handle: Handle::new(scheduler),
            shutdown_grace: config.shutdown_grace,
            torn_down: false,
        }
    }

    /// Returns a handle that can spawn onto this runtime from anywhere.
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Spawns a future onto the runtime.
    ///
    /// The task starts running once the runtime is driven by
    /// [`block_on`](Self::block_on) or [`run_until_idle`](Self::run_until_idle).
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let handle = runtime.spawn(async { 21 * 2 });
    /// assert_eq!(runtime.block_on(handle).unwrap(), 42);
    /// ```
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Spawns a fallible future onto the runtime.
    pub fn try_spawn<F, T, E>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        E: Error + Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.handle.try_spawn(future)
    }

    /// Runs a future to completion on the current thread.
    ///
    /// While the future is pending, the thread runs spawned tasks, fires
    /// timers and otherwise sleeps until the next deadline or wake-up.
    /// Tasks still live when the future resolves stay registered and
    /// resume on the next call.
    ///
    /// Concurrent calls from several threads are serialized.
    ///
    /// # Panics
    ///
    /// Panics if called from within a running runtime.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let result = runtime.block_on(async {
    ///     42
    /// });
    /// assert_eq!(result, 42);
    /// ```
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        driver::block_on(&self.handle, future)
    }

    /// Drives the runtime until every spawned task has finished.
    ///
    /// # Panics
    ///
    /// Panics if called from within a running runtime.
    pub fn run_until_idle(&self) {
        assert!(
            !context::is_entered(),
            "cannot drive a strand runtime from within a runtime"
        );

        driver::run_until_idle(&self.handle, None);
    }

    /// Shuts the runtime down with the configured grace period.
    pub fn shutdown(self) -> ShutdownReport {
        let grace = self.shutdown_grace;
        self.shutdown_timeout(grace)
    }

    /// Shuts the runtime down, letting live tasks run for at most `grace`.
    ///
    /// Tasks still live afterwards fail with `Shutdown` and their futures
    /// are dropped, which cancels their timers. Blocking operations cannot
    /// be interrupted; their threads are left to finish in the background.
    pub fn shutdown_timeout(mut self, grace: Duration) -> ShutdownReport {
        self.teardown(grace)
    }

    fn teardown(&mut self, grace: Duration) -> ShutdownReport {
        self.torn_down = true;

        let scheduler = self.handle.scheduler();
        let deadline = Instant::now() + grace;

        debug!(live = scheduler.live(), ?grace, "runtime shutting down");

        // Dropped from inside a driven runtime: the thread cannot drive
        // this one as well, so live tasks are aborted right away.
        let drained = if context::is_entered() {
            scheduler.live() == 0
        } else {
            driver::run_until_idle(&self.handle, Some(deadline))
        };

        let (aborted, unobserved) = scheduler.close(deadline);

        ShutdownReport {
            drained,
            aborted,
            unobserved,
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.torn_down {
            let grace = self.shutdown_grace;
            self.teardown(grace);
        }
    }
}

