//! Async runtime helpers for blocking callers.
//!
//! The consumer API is synchronous while the HTTP stack is async. This module
//! provides the single entry point used to drive a future to completion from
//! synchronous code, reusing the current Tokio runtime when available.

use anyhow::anyhow;
use once_cell::sync::OnceCell;
use std::future::Future;
use tokio::{
    runtime::{Builder, Handle, Runtime, RuntimeFlavor},
    task,
};

/// Runtime shared by call sites outside Tokio. It outlives individual calls so
/// pooled HTTP connections stay usable between requests.
static FALLBACK_RUNTIME: OnceCell<Runtime> = OnceCell::new();

/// Execute an async future from synchronous code.
///
/// # Arguments
/// - `future`: The future to run to completion.
///
/// # Returns
/// Returns the future's output or an error if a Tokio runtime cannot be created
/// or the current runtime cannot be blocked on.
///
/// # Notes
/// - Reuses the current multi-threaded runtime when available.
/// - Falls back to a shared process-wide runtime for call sites outside Tokio.
/// - Refuses to block inside a current-thread runtime, which would deadlock.
pub fn block_on_future<F, T>(future: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
            return Err(anyhow!(
                "cannot block on a request from inside a current-thread Tokio runtime; use a multi-threaded runtime"
            ));
        }
        task::block_in_place(|| handle.block_on(future))
    } else {
        let runtime = FALLBACK_RUNTIME.get_or_try_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("oembed-http")
                .enable_all()
                .build()
                .map_err(|error| anyhow!(error))
        })?;
        runtime.block_on(future)
    }
}
