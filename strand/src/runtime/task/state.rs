use std::sync::atomic::{AtomicUsize, Ordering};

/// Task is waiting in the run queue.
///
/// Set on spawn and whenever a suspended task is woken.
pub(crate) const QUEUED: usize = 0;

/// Task is being polled by the driver.
///
/// At most one driver may observe this state at a time.
pub(crate) const RUNNING: usize = 1;

/// Task returned `Poll::Pending` and waits for a wake-up.
pub(crate) const SUSPENDED: usize = 2;

/// Task was woken while running.
///
/// It is re-queued as soon as the current poll returns.
pub(crate) const NOTIFIED: usize = 3;

/// Task produced a value. Terminal.
pub(crate) const COMPLETED: usize = 4;

/// Task produced a failure. Terminal.
pub(crate) const FAILED: usize = 5;

/// Observable lifecycle of a task.
///
/// Transitions only move forward: once a task is `Completed` or `Failed`
/// it never changes state again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Spawned or woken, waiting to be polled.
    Pending,

    /// Currently being polled.
    Running,

    /// Parked at a suspension point.
    Suspended,

    Completed,

    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// Atomic task state word shared between the driver, wakers and handles.
pub(crate) struct State(AtomicUsize);

impl State {
    pub(crate) fn new() -> Self {
        Self(AtomicUsize::new(QUEUED))
    }

    pub(crate) fn load(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn transition(&self, from: usize, to: usize) -> bool {
        self.0
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn store(&self, to: usize) {
        self.0.store(to, Ordering::Release);
    }

    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self.load(), COMPLETED | FAILED)
    }

    pub(crate) fn snapshot(&self) -> TaskState {
        match self.load() {
            QUEUED => TaskState::Pending,
            RUNNING | NOTIFIED => TaskState::Running,
            SUSPENDED => TaskState::Suspended,
            COMPLETED => TaskState::Completed,
            _ => TaskState::Failed,
        }
    }
}
