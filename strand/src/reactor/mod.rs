//! Timers and blocking I/O.
//!
//! The reactor side of the runtime: everything that makes a suspended
//! task ready again without the task itself running.
//! - [`timer`] keeps pending sleep deadlines in firing order,
//! - [`blocking`] runs operations that would otherwise stall the driver,
//! - [`io`] is the future tasks await while such an operation runs.
//!
//! The driver owns neither thread nor poller here: it fires expired timers
//! between batches of tasks and parks until the next deadline, while the
//! blocking pool wakes tasks directly when their operation completes.

mod blocking;
mod timer;

pub(crate) mod io;

pub(crate) use blocking::BlockingPool;
pub(crate) use timer::{TimerKey, TimerQueue};
