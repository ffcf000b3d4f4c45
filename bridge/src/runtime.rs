use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Fallback Tokio runtime for timers spawned outside any runtime (e.g. a UI thread).
static TOKIO: once_cell::sync::Lazy<Runtime> = once_cell::sync::Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

/// Spawn on the ambient runtime if there is one, else on the fallback runtime.
pub(crate) fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => handle.spawn(future),
        Err(_) => {
            log::debug!("No ambient Tokio runtime, using fallback");
            TOKIO.spawn(future)
        }
    }
}
