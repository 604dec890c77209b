//! # Strand
//!
//! **Strand** is a small structured-concurrency runtime for Rust.
//!
//! Tasks run cooperatively on the thread that drives the runtime: a task
//! body runs uninterrupted until it reaches an explicit suspension point
//! (`sleep`, `perform_io`, awaiting another task or `yield_now`). Timers
//! and blocking I/O let many tasks wait at once, so N tasks sleeping for
//! D each finish after roughly D, not N × D.
//!
//! Failures stay with the task that produced them:
//!
//! - an error returned by a task body or a panic inside it is captured
//!   as a [`TaskFailure`],
//! - only whoever awaits the task observes it,
//! - [`task::await_all`] and [`task::JoinSet`] collect results and
//!   failures side by side and never cancel siblings on error,
//! - failures nobody observed are reported when the runtime shuts down.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strand::task;
//! use strand::time::sleep_ms;
//!
//! #[strand::main]
//! async fn main() {
//!     let handles = (1..=3).map(|i| {
//!         task::spawn(async move {
//!             sleep_ms(200).await;
//!             i * 10
//!         })
//!     });
//!
//!     let (results, failures) = task::await_all(handles).await;
//!     assert_eq!(results, vec![10, 20, 30]);
//!     assert!(failures.is_empty());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`task`] — Spawning, join handles, `JoinSet` and `await_all`
//! - [`time`] — Sleep, timeout and timing
//! - [`io`] — Blocking operations run off the scheduler thread

mod error;
mod reactor;
mod runtime;
mod utils;

pub mod io;
pub mod time;

pub use error::{BuildError, Elapsed, FailureKind, IoErrorCode, IoFailure, TaskFailure};
pub use runtime::builder::{MAX_BLOCKING_THREADS, RuntimeBuilder};
pub use runtime::task;
pub use runtime::yield_now::yield_now;
pub use runtime::{Handle, Runtime, ShutdownReport};

pub use strand_macros::{main, test};
