//! Timers.
//!
//! This module provides time-related asynchronous utilities backed by
//! the runtime's timer queue.
//!
//! It includes:
//! - [`sleep`], [`sleep_ms`] and [`sleep_until`] for suspending a task,
//! - [`timeout`] for bounding future execution time,
//! - [`instrumented`] for measuring how long a future takes.

mod instrumented;
mod sleep;
mod timeout;

#[doc(inline)]
pub use instrumented::{Instrumented, instrumented};

#[doc(inline)]
pub use sleep::{Sleep, sleep, sleep_ms, sleep_until};

#[doc(inline)]
pub use timeout::{Timeout, timeout};

pub use crate::error::Elapsed;
