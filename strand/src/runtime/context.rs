use crate::runtime::Handle;

use std::cell::RefCell;

thread_local! {
    /// Handle of the runtime currently driven by this thread.
    ///
    /// Installed by the driver for the duration of `block_on` and drains so
    /// that free functions like `task::spawn` and `time::sleep` can reach
    /// the scheduler without explicit parameter passing.
    static CURRENT: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Restores the previously installed handle when dropped.
pub(crate) struct EnterGuard {
    previous: Option<Handle>,
}

/// Installs `handle` as the current runtime for this thread.
///
/// The previous context is restored when the returned guard is dropped,
/// including while unwinding.
pub(crate) fn enter(handle: Handle) -> EnterGuard {
    let previous = CURRENT.with(|current| current.replace(Some(handle)));

    EnterGuard { previous }
}

impl Drop for EnterGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| current.replace(previous));
    }
}

/// Returns the handle of the runtime driving this thread, if any.
pub(crate) fn current() -> Option<Handle> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Returns `true` if this thread is currently driving a runtime.
pub(crate) fn is_entered() -> bool {
    CURRENT.with(|current| current.borrow().is_some())
}
