use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Handle of the tokio runtime the current thread runs in, if any.
pub fn current() -> Option<Handle> {
    Handle::try_current().ok()
}

/// Spawns the future on the given runtime. Works from any thread.
pub fn spawn<T>(runtime: &Handle, future: T) -> JoinHandle<T::Output>
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    runtime.spawn(future)
}
