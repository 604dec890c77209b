//! Failure taxonomy.
//!
//! Failures never cross task boundaries on their own: a task body that
//! returns an error or panics is captured into a [`TaskFailure`] stored on
//! the task, and only whoever awaits that task observes it.

use crate::task::TaskId;

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// What made a task fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The task body returned an error.
    Error,

    /// The task body returned an [`IoFailure`].
    Io,

    /// The task body panicked.
    Panic,

    /// The task was aborted before it finished.
    Cancelled,

    /// The runtime was torn down while the task was still live.
    Shutdown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Error => "error",
            FailureKind::Io => "io",
            FailureKind::Panic => "panic",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Shutdown => "shutdown",
        };

        f.write_str(name)
    }
}

/// A failure captured from a task body.
///
/// `TaskFailure` is cheap to clone: the original error, if any, is kept
/// behind an `Arc` and exposed through [`Error::source`] and
/// [`downcast_ref`](Self::downcast_ref).
#[derive(Debug, Clone, thiserror::Error)]
#[error("task {task} failed ({kind}): {message}")]
pub struct TaskFailure {
    task: TaskId,
    kind: FailureKind,
    message: String,
    #[source]
    cause: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl TaskFailure {
    pub(crate) fn new(task: TaskId, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            task,
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Captures an error returned by a task body.
    ///
    /// The kind is [`FailureKind::Io`] when the error is an [`IoFailure`].
    pub(crate) fn from_error<E>(task: TaskId, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let cause: Arc<dyn Error + Send + Sync + 'static> = Arc::new(error);
        let kind = if cause.is::<IoFailure>() {
            FailureKind::Io
        } else {
            FailureKind::Error
        };

        Self {
            task,
            kind,
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// Captures the payload of a panic raised while polling a task.
    pub(crate) fn from_panic(task: TaskId, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        Self::new(task, FailureKind::Panic, message)
    }

    pub(crate) fn cancelled(task: TaskId) -> Self {
        Self::new(task, FailureKind::Cancelled, "task was aborted")
    }

    pub(crate) fn shutdown(task: TaskId) -> Self {
        Self::new(
            task,
            FailureKind::Shutdown,
            "runtime shut down before the task finished",
        )
    }

    /// The task that produced this failure.
    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_panic(&self) -> bool {
        self.kind == FailureKind::Panic
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }

    /// Returns the original error if it has type `E`.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.cause.as_deref().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoErrorCode {
    /// The operation did not finish in time.
    Timeout,

    /// The peer could not be reached.
    Connect,

    /// Name resolution failed.
    Dns,

    /// The secure channel could not be established.
    Tls,

    /// The peer answered with a non-success status.
    Status(u16),

    /// Any other transport error.
    Transport,

    /// The operation was abandoned before it produced a result.
    Cancelled,
}

impl fmt::Display for IoErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoErrorCode::Timeout => f.write_str("timeout"),
            IoErrorCode::Connect => f.write_str("connect"),
            IoErrorCode::Dns => f.write_str("dns"),
            IoErrorCode::Tls => f.write_str("tls"),
            IoErrorCode::Status(status) => write!(f, "status {status}"),
            IoErrorCode::Transport => f.write_str("transport"),
            IoErrorCode::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Failure of an operation passed to [`perform_io`](crate::io::perform_io).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("I/O failure ({code}): {message}")]
pub struct IoFailure {
    pub code: IoErrorCode,
    pub message: String,
}

impl IoFailure {
    pub fn new(code: IoErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(IoErrorCode::Timeout, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(IoErrorCode::Status(status), message)
    }

    pub fn is_timeout(&self) -> bool {
        self.code == IoErrorCode::Timeout
    }
}

impl From<io::Error> for IoFailure {
    fn from(err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => IoErrorCode::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable => IoErrorCode::Connect,
            io::ErrorKind::Interrupted => IoErrorCode::Cancelled,
            _ => IoErrorCode::Transport,
        };

        Self::new(code, err.to_string())
    }
}

/// Returned by [`timeout`](crate::time::timeout) when the deadline passes
/// before the wrapped future completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline elapsed")]
pub struct Elapsed(());

impl Elapsed {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

impl From<Elapsed> for IoFailure {
    fn from(_: Elapsed) -> Self {
        IoFailure::timeout("deadline elapsed")
    }
}

/// Invalid [`RuntimeBuilder`](crate::RuntimeBuilder) configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("blocking_threads must be between 1 and {max}, got {got}")]
    BlockingThreads { got: usize, max: usize },

    #[error("thread name must not be empty")]
    EmptyThreadName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("bad input: {0}")]
    struct BadInput(u32);

    #[test]
    fn error_source_is_preserved() {
        let failure = TaskFailure::from_error(TaskId::from_raw(7), BadInput(3));

        assert_eq!(failure.kind(), FailureKind::Error);
        assert_eq!(failure.message(), "bad input: 3");
        assert_eq!(failure.downcast_ref::<BadInput>().map(|e| e.0), Some(3));
        assert!(failure.source().is_some());
        assert_eq!(failure.to_string(), "task #7 failed (error): bad input: 3");
    }

    #[test]
    fn io_failure_is_classified_as_io() {
        let failure =
            TaskFailure::from_error(TaskId::from_raw(1), IoFailure::status(503, "unavailable"));

        assert_eq!(failure.kind(), FailureKind::Io);
        assert_eq!(
            failure.downcast_ref::<IoFailure>().map(|e| e.code),
            Some(IoErrorCode::Status(503))
        );
    }

    #[test]
    fn panic_payloads() {
        let from_str = TaskFailure::from_panic(TaskId::from_raw(1), Box::new("boom"));
        let from_string = TaskFailure::from_panic(TaskId::from_raw(2), Box::new(String::from("bang")));
        let opaque = TaskFailure::from_panic(TaskId::from_raw(3), Box::new(42u8));

        assert!(from_str.is_panic());
        assert_eq!(from_str.message(), "boom");
        assert_eq!(from_string.message(), "bang");
        assert_eq!(opaque.message(), "unknown panic");
        assert!(opaque.source().is_none());
    }

    #[test]
    fn io_error_conversion() {
        let timed_out: IoFailure = io::Error::new(io::ErrorKind::TimedOut, "slow").into();
        let refused: IoFailure = io::Error::new(io::ErrorKind::ConnectionRefused, "no").into();
        let other: IoFailure = io::Error::other("odd").into();

        assert!(timed_out.is_timeout());
        assert_eq!(refused.code, IoErrorCode::Connect);
        assert_eq!(other.code, IoErrorCode::Transport);
        assert_eq!(
            IoFailure::status(404, "missing").to_string(),
            "I/O failure (status 404): missing"
        );
    }
}
