use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::info;

use crate::config::DispatcherConfig;

/// Where deliveries run.
///
/// Either a handle to a runtime someone else owns, or a multi-thread runtime
/// owned by this pool. An owned runtime is stopped without waiting for
/// in-flight deliveries when the pool is dropped.
#[derive(Debug)]
pub struct WorkerPool {
    handle: Handle,
    owned: Option<Runtime>,
}

impl WorkerPool {
    /// Submits to a runtime owned elsewhere.
    pub fn shared(handle: Handle) -> Self {
        Self {
            handle,
            owned: None,
        }
    }

    /// Submits to the runtime the caller is running in, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::shared)
    }

    /// Builds and owns a multi-thread runtime.
    pub fn dedicated(worker_threads: usize, thread_name: &str) -> std::io::Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.thread_name(thread_name).enable_all();
        if worker_threads > 0 {
            builder.worker_threads(worker_threads);
        }
        let runtime = builder.build()?;

        info!(
            target: "localmq::pool",
            worker_threads,
            thread_name,
            "Started dedicated worker pool"
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Some(runtime),
        })
    }

    /// Reuses the ambient runtime unless `dedicated_pool` is set or there is none.
    pub fn from_config(cfg: &DispatcherConfig) -> std::io::Result<Self> {
        if !cfg.dedicated_pool {
            if let Some(pool) = Self::current() {
                return Ok(pool);
            }
        }
        Self::dedicated(cfg.worker_threads, &cfg.thread_name)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn is_owned(&self) -> bool {
        self.owned.is_some()
    }

    /// Fire-and-forget: the join handle is dropped, the task keeps running.
    ///
    /// If the runtime behind a shared handle has already shut down, the task
    /// is dropped without being polled. Callers that account for submitted
    /// work must do so from inside the task (or its `Drop`).
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.handle.spawn(fut));
    }

    /// Same shutdown caveat as [`spawn`](Self::spawn): `f` may be dropped unrun.
    pub fn spawn_blocking<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        drop(self.handle.spawn_blocking(f));
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Some(runtime) = self.owned.take() {
            info!(target: "localmq::pool", "Stopping dedicated worker pool");
            runtime.shutdown_background();
        }
    }
}
