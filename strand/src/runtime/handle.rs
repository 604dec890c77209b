use crate::error::TaskFailure;
use crate::runtime::context;
use crate::runtime::executor::Scheduler;
use crate::task::JoinHandle;

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A cloneable reference to a runtime's scheduler.
///
/// Tasks spawned through a `Handle` run on the thread driving the
/// runtime, whichever thread they were spawned from. Inside a task or a
/// `block_on` call, [`Handle::current`] returns the handle of the runtime
/// being driven.
#[derive(Clone)]
pub struct Handle {
    scheduler: Arc<Scheduler>,
}

impl Handle {
    pub(crate) fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Returns the handle of the runtime driving the current thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a running runtime.
    pub fn current() -> Self {
        context::current().expect("Handle::current called outside of a strand runtime")
    }

    /// Returns the handle of the runtime driving the current thread, if any.
    pub fn try_current() -> Option<Self> {
        context::current()
    }

    /// Spawns a future as a new task.
    ///
    /// The handle is returned immediately; the task runs the next time the
    /// runtime is driven. After the runtime has shut down, the returned
    /// handle resolves to a `Shutdown` failure.
    pub fn spawn<F, T>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        self.scheduler
            .spawn_with(|_| Box::pin(async move { Ok(future.await) }))
    }

    /// Spawns a fallible future as a new task.
    ///
    /// An `Err` returned by the body becomes the task's [`TaskFailure`],
    /// keeping the error as its source.
    pub fn try_spawn<F, T, E>(&self, future: F) -> JoinHandle<T>
    where
        T: Send + 'static,
        E: Error + Send + Sync + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.scheduler.spawn_with(|id| {
            Box::pin(async move {
                future
                    .await
                    .map_err(|error| TaskFailure::from_error(id, error))
            })
        })
    }

    pub(crate) fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("live_tasks", &self.scheduler.live())
            .field("closed", &self.scheduler.is_closed())
            .finish()
    }
}
