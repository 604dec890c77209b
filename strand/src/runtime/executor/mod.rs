//! Task execution.
//!
//! - [`core`]: scheduler state, task registry and teardown,
//! - [`driver`]: the loop that runs ready tasks, fires timers and parks
//!   the calling thread when there is nothing to do.
//!
//! Everything runs on the thread that drives the runtime; only blocking
//! I/O is handed to other threads.

pub(crate) mod core;
pub(crate) mod driver;

pub(crate) use self::core::Scheduler;
