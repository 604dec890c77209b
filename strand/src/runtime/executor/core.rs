use crate::error::TaskFailure;
use crate::reactor::{BlockingPool, TimerQueue};
use crate::runtime::queue::RunQueue;
use crate::runtime::task::{JoinHandle, Runnable, Task, TaskFuture, TaskId};
use crate::utils::Slab;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

/// Scheduler state shared by the driver, task handles and wakers.
///
/// The `Scheduler` is responsible for:
/// - registering spawned tasks and handing out their identifiers,
/// - queueing ready tasks for the driver,
/// - keeping the timer queue and the blocking pool,
/// - collecting failures no handle ever observed,
/// - tearing every live task down on shutdown.
///
/// It never runs tasks itself; see [`driver`](super::driver).
pub(crate) struct Scheduler {
    queue: RunQueue,

    timers: Mutex<TimerQueue>,

    /// Every live task, keyed by the slot stored in the task.
    registry: Mutex<Slab<Arc<dyn Runnable>>>,

    /// Failures of detached tasks, reported at teardown.
    unobserved: Mutex<Vec<TaskFailure>>,

    blocking: BlockingPool,

    next_id: AtomicU64,

    /// Set once teardown has started; later spawns fail immediately.
    closed: AtomicBool,

    /// Held by whichever thread is driving the scheduler.
    driver: Mutex<()>,
}

impl Scheduler {
    pub(crate) fn new(blocking: BlockingPool) -> Self {
        Self {
            queue: RunQueue::new(),
            timers: Mutex::new(TimerQueue::new()),
            registry: Mutex::new(Slab::new()),
            unobserved: Mutex::new(Vec::new()),
            blocking,
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            driver: Mutex::new(()),
        }
    }

    /// Registers a new task and queues it for its first poll.
    ///
    /// `make` receives the task identifier so fallible bodies can tag
    /// their failures with it. After teardown has started the task is
    /// failed with `Shutdown` right away and its body is never polled.
    pub(crate) fn spawn_with<T, M>(self: &Arc<Self>, make: M) -> JoinHandle<T>
    where
        T: Send + 'static,
        M: FnOnce(TaskId) -> TaskFuture<T>,
    {
        let id = TaskId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let future = make(id);

        let mut registry = self.registry.lock().unwrap();

        // `close` raises the flag before draining the registry, so under the
        // lock either the flag is visible or the drain has not happened yet.
        if self.is_closed() {
            drop(registry);

            let task = Arc::new(Task::new(id, usize::MAX, future, self.clone()));
            task.clone().shutdown();
            return JoinHandle::new(task);
        }

        let slot = registry.vacant_key();
        let task = Arc::new(Task::new(id, slot, future, self.clone()));
        registry.insert(task.clone());
        drop(registry);

        trace!(task = %id, "task spawned");
        self.schedule(task.clone());

        JoinHandle::new(task)
    }

    /// Pushes a ready task onto the run queue.
    ///
    /// Dropped silently once the queue is closed; teardown fails the task
    /// through the registry instead.
    pub(crate) fn schedule(&self, task: Arc<dyn Runnable>) {
        if !self.queue.push(task) {
            trace!("run queue closed, task not scheduled");
        }
    }

    /// Removes a finished task from the registry.
    pub(crate) fn release(&self, slot: usize) {
        self.registry.lock().unwrap().remove(slot);
    }

    pub(crate) fn report_unobserved(&self, failure: TaskFailure) {
        debug!(task = %failure.task(), kind = %failure.kind(), "failure recorded as unobserved");
        self.unobserved.lock().unwrap().push(failure);
    }

    /// Number of tasks not yet in a terminal state.
    pub(crate) fn live(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn queue(&self) -> &RunQueue {
        &self.queue
    }

    pub(crate) fn timers(&self) -> MutexGuard<'_, TimerQueue> {
        self.timers.lock().unwrap()
    }

    pub(crate) fn blocking(&self) -> &BlockingPool {
        &self.blocking
    }

    /// Acquires the right to drive this scheduler.
    ///
    /// A previous driver that panicked leaves nothing inconsistent behind,
    /// so poisoning is ignored.
    pub(crate) fn lock_driver(&self) -> MutexGuard<'_, ()> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the tasks that are ready right now, after waking every task
    /// whose timer has expired.
    ///
    /// Tasks woken while the batch runs wait for the next tick, which
    /// gives the root future a chance to run in between.
    pub(crate) fn tick(&self) {
        let expired = self.timers().expired(Instant::now());
        if !expired.is_empty() {
            trace!(count = expired.len(), "timers fired");
        }

        // Wakers push onto the run queue; the timer lock must be released.
        for waker in expired {
            waker.wake();
        }

        for _ in 0..self.queue.len() {
            match self.queue.pop() {
                Some(task) => task.run(),
                None => break,
            }
        }
    }

    /// Parks the driver until there is work, `notified` is raised, the
    /// next timer is due or `deadline` passes.
    pub(crate) fn park(&self, notified: Option<&AtomicBool>, deadline: Option<Instant>) {
        let next_timer = self.timers().next_deadline();

        let deadline = match (next_timer, deadline) {
            (Some(timer), Some(deadline)) => Some(timer.min(deadline)),
            (timer, deadline) => timer.or(deadline),
        };

        self.queue.park(notified, deadline);
    }

    /// Tears the scheduler down.
    ///
    /// Fails every live task with `Shutdown`, clears pending timers and
    /// closes the blocking pool, waiting for busy threads at most until
    /// `deadline`. Returns how many tasks were aborted together with the
    /// failures nobody observed.
    pub(crate) fn close(&self, deadline: Instant) -> (usize, Vec<TaskFailure>) {
        self.closed.store(true, Ordering::Release);

        // Queued tasks are still in the registry.
        drop(self.queue.close());

        let tasks = self.registry.lock().unwrap().drain();
        let cleared = self.timers().clear();

        // Dropping task bodies may touch the registry and the timers.
        let mut aborted = 0;
        for task in tasks {
            let id = task.id();
            if task.shutdown() {
                trace!(task = %id, "task aborted by shutdown");
                aborted += 1;
            }
        }

        // Bodies dropped above may have released more timers.
        let cleared = cleared + self.timers().clear();

        let remaining = deadline.saturating_duration_since(Instant::now());
        let dropped = self.blocking.shutdown(remaining.max(Duration::from_millis(1)));

        let unobserved = std::mem::take(&mut *self.unobserved.lock().unwrap());
        for failure in &unobserved {
            warn!(
                task = %failure.task(),
                kind = %failure.kind(),
                "unobserved task failure: {}",
                failure.message()
            );
        }

        debug!(
            aborted,
            timers = cleared,
            blocking_jobs = dropped,
            unobserved = unobserved.len(),
            "scheduler closed"
        );

        (aborted, unobserved)
    }
}
