//! Core runtime components.
//!
//! This module contains the fundamental building blocks of the runtime,
//! including task execution, scheduling, and cooperative yielding.
//!
//! It is responsible for:
//! - driving tasks on the thread that calls `block_on`,
//! - queueing ready tasks and parking the driver when idle,
//! - providing the runtime context used by free functions such as
//!   [`task::spawn`] and [`sleep`](crate::time::sleep),
//! - enabling cooperative multitasking via yielding.

mod core;
mod executor;
mod handle;
mod queue;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod yield_now;

pub mod task;

pub(crate) use executor::Scheduler;

pub use self::core::{Runtime, ShutdownReport};
pub use handle::Handle;
