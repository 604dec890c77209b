use super::JoinHandle;
use super::state::{COMPLETED, FAILED, NOTIFIED, QUEUED, RUNNING, State, SUSPENDED};
use crate::error::{FailureKind, TaskFailure};
use crate::runtime::context;
use crate::runtime::executor::Scheduler;
use crate::runtime::task::waker::make_waker;

use std::cell::UnsafeCell;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use tracing::{debug, trace, trace_span};

/// The boxed body of a task, already mapped to the task's outcome type.
pub(crate) type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskFailure>> + Send>>;

/// Opaque identifier of a spawned task.
///
/// Identifiers are unique per runtime and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A runnable unit of work owned by the scheduler.
///
/// Erases the output type so the run queue and the task registry can hold
/// heterogeneous tasks behind `Arc<dyn Runnable>`.
pub(crate) trait Runnable: Send + Sync {
    fn id(&self) -> TaskId;

    /// Polls the task once. Called by the driver only.
    fn run(self: Arc<Self>);

    /// Fails a live task with [`FailureKind::Shutdown`] and drops its body.
    ///
    /// Returns `false` if the task had already reached a terminal state.
    fn shutdown(self: Arc<Self>) -> bool;
}

/// Outcome storage shared between the task and its handles.
pub(crate) struct Completion<T> {
    pub(crate) outcome: Option<Result<T, TaskFailure>>,

    /// Set once any handle has seen the outcome.
    pub(crate) observed: bool,

    /// Set when the last handle was dropped without observing the outcome.
    pub(crate) detached: bool,
}

/// A spawned task.
///
/// The future lives in an `UnsafeCell`; only the driver that moved the
/// state word to `RUNNING` may touch it.
pub(crate) struct Task<T> {
    id: TaskId,

    /// Key of this task in the scheduler registry.
    slot: usize,

    future: UnsafeCell<Option<TaskFuture<T>>>,

    pub(crate) state: State,

    pub(crate) completion: Mutex<Completion<T>>,

    /// Wakers of everything awaiting this task.
    waiters: Mutex<Vec<Waker>>,

    abort_requested: AtomicBool,

    scheduler: Arc<Scheduler>,
}

unsafe impl<T: Send> Send for Task<T> {}
unsafe impl<T: Send> Sync for Task<T> {}

impl<T: Send + 'static> Task<T> {
    pub(crate) fn new(
        id: TaskId,
        slot: usize,
        future: TaskFuture<T>,
        scheduler: Arc<Scheduler>,
    ) -> Self {
        Self {
            id,
            slot,
            future: UnsafeCell::new(Some(future)),
            state: State::new(),
            completion: Mutex::new(Completion {
                outcome: None,
                observed: false,
                detached: false,
            }),
            waiters: Mutex::new(Vec::new()),
            abort_requested: AtomicBool::new(false),
            scheduler,
        }
    }

    fn poll_once(self: Arc<Self>) {
        if !self.state.transition(QUEUED, RUNNING) {
            return;
        }

        // SAFETY: the RUNNING state grants exclusive access to the future.
        let slot = unsafe { &mut *self.future.get() };

        if self.abort_requested.load(Ordering::Acquire) {
            drop(slot.take());
            self.finish(Err(TaskFailure::cancelled(self.id)));
            return;
        }

        let Some(future) = slot.as_mut() else {
            return;
        };

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        let poll = {
            let _span = trace_span!("poll", task = %self.id).entered();
            panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx)))
        };

        match poll {
            Ok(Poll::Pending) => {
                if !self.state.transition(RUNNING, SUSPENDED) {
                    // Woken while running; go straight back to the queue.
                    self.state.store(QUEUED);
                    self.scheduler.schedule(self.clone());
                }
            }
            Ok(Poll::Ready(outcome)) => {
                drop(slot.take());
                self.finish(outcome);
            }
            Err(payload) => {
                drop(slot.take());
                self.finish(Err(TaskFailure::from_panic(self.id, payload)));
            }
        }
    }

    /// Stores the outcome, leaves the registry and wakes every waiter.
    fn finish(&self, outcome: Result<T, TaskFailure>) {
        let unobserved = {
            let mut completion = self.completion.lock().unwrap();

            let unobserved = match &outcome {
                Ok(_) => {
                    trace!(task = %self.id, "task completed");
                    None
                }
                Err(failure) => {
                    debug!(
                        task = %self.id,
                        kind = %failure.kind(),
                        message = failure.message(),
                        "task failed"
                    );
                    (completion.detached && is_reportable(failure)).then(|| failure.clone())
                }
            };

            let failed = outcome.is_err();
            completion.outcome = Some(outcome);
            self.state.store(if failed { FAILED } else { COMPLETED });

            if unobserved.is_some() {
                completion.observed = true;
            }

            unobserved
        };

        self.scheduler.release(self.slot);

        if let Some(failure) = unobserved {
            self.scheduler.report_unobserved(failure);
        }

        let waiters = std::mem::take(&mut *self.waiters.lock().unwrap());
        for waker in waiters {
            waker.wake();
        }
    }

    /// Reschedules the task after a wake-up.
    ///
    /// A suspended task moves back to the queue; a running task is marked
    /// `NOTIFIED` so the driver re-queues it once the current poll returns.
    pub(crate) fn notify(self: Arc<Self>) {
        loop {
            match self.state.load() {
                SUSPENDED => {
                    if self.state.transition(SUSPENDED, QUEUED) {
                        let scheduler = self.scheduler.clone();
                        scheduler.schedule(self);
                        return;
                    }
                }
                RUNNING => {
                    if self.state.transition(RUNNING, NOTIFIED) {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Requests cooperative cancellation.
    ///
    /// The body is dropped the next time the driver picks the task up, never
    /// in the middle of a poll.
    pub(crate) fn abort(self: &Arc<Self>) {
        if self.state.is_terminal() {
            return;
        }

        self.abort_requested.store(true, Ordering::Release);
        self.clone().notify();
    }
}

impl<T> Task<T> {
    pub(crate) fn id(&self) -> TaskId {
        self.id
    }

    /// Registers `waker` to be woken on completion.
    ///
    /// Returns `true` if the task is already terminal.
    pub(crate) fn register_waiter(&self, waker: &Waker) -> bool {
        if self.state.is_terminal() {
            return true;
        }

        {
            let mut waiters = self.waiters.lock().unwrap();
            if !waiters.iter().any(|w| w.will_wake(waker)) {
                waiters.push(waker.clone());
            }
        }

        // Re-check after registering to avoid a missed wake-up.
        self.state.is_terminal()
    }

    /// Marks the task as no longer observable through any handle.
    pub(crate) fn detach(&self) {
        let unobserved = {
            let mut completion = self.completion.lock().unwrap();
            completion.detached = true;

            let report = match &completion.outcome {
                Some(Err(failure)) if !completion.observed && is_reportable(failure) => {
                    Some(failure.clone())
                }
                _ => None,
            };

            if report.is_some() {
                completion.observed = true;
            }

            report
        };

        if let Some(failure) = unobserved {
            self.scheduler.report_unobserved(failure);
        }
    }
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn id(&self) -> TaskId {
        self.id
    }

    fn run(self: Arc<Self>) {
        self.poll_once();
    }

    fn shutdown(self: Arc<Self>) -> bool {
        loop {
            let state = self.state.load();

            if state == COMPLETED || state == FAILED {
                return false;
            }

            if state == RUNNING || state == NOTIFIED {
                // Teardown from inside this task's own poll; the body is
                // dropped when the task is next picked up.
                self.abort_requested.store(true, Ordering::Release);
                return true;
            }

            if self.state.transition(state, RUNNING) {
                break;
            }
        }

        // SAFETY: the state word is RUNNING and the driver has stopped.
        let future = unsafe { (*self.future.get()).take() };
        drop(future);

        self.finish(Err(TaskFailure::shutdown(self.id)));
        true
    }
}

/// Failures worth surfacing when nobody awaited them.
fn is_reportable(failure: &TaskFailure) -> bool {
    !matches!(
        failure.kind(),
        FailureKind::Cancelled | FailureKind::Shutdown
    )
}

/// Spawns a future as a task onto the runtime driving the current thread.
///
/// The task starts in the `Pending` state and runs once the driver picks
/// it up; the returned handle is available immediately.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime. Use
/// [`Handle::spawn`](crate::Handle::spawn) to spawn from other threads.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    context::current()
        .expect("spawn must be called within the context of a strand runtime")
        .spawn(future)
}

/// Spawns a fallible future onto the runtime driving the current thread.
///
/// An `Err` returned by the body becomes the task's [`TaskFailure`], with
/// the error kept as its source.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn try_spawn<F, T, E>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    context::current()
        .expect("try_spawn must be called within the context of a strand runtime")
        .try_spawn(future)
}
