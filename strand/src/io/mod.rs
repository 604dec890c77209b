//! Blocking I/O without blocking the scheduler.
//!
//! Tasks hand operations that would stall the driver (an HTTP request, a
//! file read) to [`perform_io`]. The operation runs on the runtime's
//! blocking pool while the task is suspended; every other task keeps
//! running. The task resumes with the operation's result or its
//! [`IoFailure`].
//!
//! The filesystem helpers below are thin wrappers over `std::fs` run the
//! same way.

use std::path::Path;

pub use crate::error::{IoErrorCode, IoFailure};
pub use crate::reactor::io::PerformIo;

/// Runs `op` on the blocking pool and suspends the calling task until it
/// returns.
///
/// The operation starts on first poll. Dropping the future before it
/// resolves discards the result; the operation itself runs to its end.
/// A panic inside `op` is reported as an [`IoErrorCode::Transport`]
/// failure.
///
/// # Panics
///
/// Panics if polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let body = perform_io(move || fetch(&url)).await?;
/// ```
pub fn perform_io<F, T>(op: F) -> PerformIo<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, IoFailure> + Send + 'static,
{
    PerformIo::new(op)
}

/// Reads the entire contents of a file.
pub async fn read(path: impl AsRef<Path>) -> Result<Vec<u8>, IoFailure> {
    let path = path.as_ref().to_path_buf();
    perform_io(move || Ok(std::fs::read(path)?)).await
}

/// Reads the entire contents of a file into a string.
pub async fn read_to_string(path: impl AsRef<Path>) -> Result<String, IoFailure> {
    let path = path.as_ref().to_path_buf();
    perform_io(move || Ok(std::fs::read_to_string(path)?)).await
}

/// Writes `contents` to a file, replacing it if it exists.
pub async fn write(path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Result<(), IoFailure> {
    let path = path.as_ref().to_path_buf();
    let contents = contents.into();
    perform_io(move || Ok(std::fs::write(path, contents)?)).await
}
