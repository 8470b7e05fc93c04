use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::core::error::panic_detail;

/// Blocking handler body.
pub type SyncHandlerFn = dyn Fn(&str) -> anyhow::Result<()> + Send + Sync;

/// Async handler body; the returned future owns the message.
pub type AsyncHandlerFn = dyn Fn(String) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// The function bound to a topic.
///
/// Cloning is cheap (one `Arc` bump). A delivery captures its own clone, so a
/// handler replaced or unbound mid-flight still finishes the work it was
/// already given.
#[derive(Clone)]
pub enum Handler {
    /// Runs on the pool's blocking threads.
    Sync(Arc<SyncHandlerFn>),
    /// Runs as a task on the pool's async workers.
    Async(Arc<AsyncHandlerFn>),
}

impl Handler {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Handler::Sync(Arc::new(f))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Handler::Async(Arc::new(move |message: String| f(message).boxed()))
    }

    #[inline]
    pub fn is_async(&self) -> bool {
        matches!(self, Handler::Async(_))
    }

    /// True if both values point at the same handler allocation.
    pub fn same_as(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Sync(a), Handler::Sync(b)) => Arc::ptr_eq(a, b),
            (Handler::Async(a), Handler::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Sync(_) => f.write_str("Handler::Sync(..)"),
            Handler::Async(_) => f.write_str("Handler::Async(..)"),
        }
    }
}

/// Runs a blocking handler, turning both `Err` and panics into a detail string.
pub(crate) fn invoke_sync(handler: &SyncHandlerFn, message: &str) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(message))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(panic_detail(&*payload)),
    }
}

/// Async counterpart of [`invoke_sync`].
///
/// The handler may panic either while building its future or while it is
/// polled; both are caught.
pub(crate) async fn invoke_async(handler: &AsyncHandlerFn, message: String) -> Result<(), String> {
    let fut = match panic::catch_unwind(AssertUnwindSafe(|| handler(message))) {
        Ok(fut) => fut,
        Err(payload) => return Err(panic_detail(&*payload)),
    };

    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(panic_detail(&*payload)),
    }
}
