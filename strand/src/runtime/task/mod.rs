//! Asynchronous task primitives.
//!
//! This module defines how the runtime represents, schedules and joins
//! tasks:
//! - [`spawn`] and [`try_spawn`] hand a future to the scheduler and return
//!   a [`JoinHandle`] immediately,
//! - awaiting a handle yields the task's value or its captured
//!   [`TaskFailure`](crate::TaskFailure),
//! - [`JoinSet`] and [`await_all`] wait for a whole group of tasks and
//!   partition successes from failures without ever cancelling siblings
//!   on error.

pub(crate) mod core;
pub(crate) mod handle;
pub(crate) mod set;
pub(crate) mod state;
pub(crate) mod waker;

pub(crate) use self::core::{Runnable, Task, TaskFuture};

pub use self::core::{TaskId, spawn, try_spawn};
pub use handle::{Join, JoinHandle};
pub use set::{JoinSet, Partitioned, await_all};
pub use state::TaskState;

pub use crate::runtime::yield_now::{YieldNow, yield_now};
