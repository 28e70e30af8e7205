//! Fixed-size worker pools
//!
//! Each pool owns a dedicated multi-threaded tokio runtime, so I/O-bound
//! fetches and CPU-bound parsing never compete for the same threads:
//! - the I/O pool runs async fetch futures
//! - the compute pool runs blocking closures directly on its workers
//!
//! Shutdown stops accepting work at once, waits up to a grace period for
//! in-flight tasks to finish, and cancels whatever is still running afterwards.

use crate::PoolError;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Name of the pool that runs page downloads
pub const IO_POOL: &str = "io";

/// Name of the pool that runs extraction, aggregation and ranking
pub const COMPUTE_POOL: &str = "compute";

/// Returns the number of threads the platform can run in parallel
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Count of submitted tasks that have not finished yet
#[derive(Default)]
struct InFlight {
    tasks: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.tasks.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(Arc::clone(self))
    }

    fn count(&self) -> usize {
        self.tasks.load(Ordering::SeqCst)
    }

    /// Resolves once no submitted task is running
    async fn wait_idle(&self) {
        loop {
            // Register before checking so a concurrent notify is not missed
            let idle = self.idle.notified();
            if self.count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Held by a running task; dropped when it completes or is cancelled
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.tasks.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// A named, fixed-size group of worker threads
pub struct WorkerPool {
    name: &'static str,
    threads: usize,
    runtime: Mutex<Option<Runtime>>,
    in_flight: Arc<InFlight>,
}

impl WorkerPool {
    /// Starts a pool with `threads` workers named `<name>-worker-N`
    pub fn new(name: &'static str, threads: usize) -> Result<Self, PoolError> {
        let threads = threads.max(1);
        let next_id = Arc::new(AtomicUsize::new(1));

        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .thread_name_fn(move || {
                let id = next_id.fetch_add(1, Ordering::Relaxed);
                format!("{}-worker-{}", name, id)
            })
            .enable_all()
            .build()
            .map_err(|source| PoolError::Build { pool: name, source })?;

        tracing::debug!("Started {} pool with {} workers", name, threads);

        Ok(Self {
            name,
            threads,
            runtime: Mutex::new(Some(runtime)),
            in_flight: Arc::new(InFlight::default()),
        })
    }

    /// Starts the I/O pool; 0 threads selects twice the available parallelism
    pub fn io(threads: usize) -> Result<Self, PoolError> {
        let threads = if threads == 0 {
            available_parallelism() * 2
        } else {
            threads
        };
        Self::new(IO_POOL, threads)
    }

    /// Starts the compute pool; 0 threads selects the available parallelism
    pub fn compute(threads: usize) -> Result<Self, PoolError> {
        let threads = if threads == 0 {
            available_parallelism()
        } else {
            threads
        };
        Self::new(COMPUTE_POOL, threads)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns a handle to the pool's runtime while it accepts work
    pub fn handle(&self) -> Result<Handle, PoolError> {
        self.lock()
            .as_ref()
            .map(|runtime| runtime.handle().clone())
            .ok_or(PoolError::Shutdown { pool: self.name })
    }

    /// Runs an async task on the pool
    pub fn submit<F>(&self, task: F) -> Result<JoinHandle<F::Output>, PoolError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = self.handle()?;
        let guard = self.in_flight.enter();

        Ok(handle.spawn(async move {
            let _guard = guard;
            task.await
        }))
    }

    /// Number of submitted tasks that have not finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    /// Runs a blocking closure on one of the pool's workers
    ///
    /// The closure occupies the worker until it returns, so at most
    /// `threads()` closures run at once.
    pub fn submit_blocking<F, T>(&self, task: F) -> Result<JoinHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(async move { task() })
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().is_none()
    }

    /// Stops accepting work and waits up to `grace` for running tasks
    ///
    /// Tasks still running after the grace period are cancelled; a blocking
    /// closure that is mid-call is left to finish on its detached thread.
    /// Calling this more than once is a no-op. Must not be called from within
    /// an async context.
    pub fn shutdown(&self, grace: Duration) {
        let runtime = self.lock().take();

        if let Some(runtime) = runtime {
            tracing::debug!(
                "Shutting down {} pool (grace {:?}, {} tasks in flight)",
                self.name,
                grace,
                self.in_flight()
            );

            let drained =
                runtime.block_on(tokio::time::timeout(grace, self.in_flight.wait_idle()));
            if drained.is_err() {
                tracing::warn!(
                    "{} pool: cancelling {} tasks still running after {:?}",
                    self.name,
                    self.in_flight(),
                    grace
                );
            }

            runtime.shutdown_background();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("threads", &self.threads)
            .field("in_flight", &self.in_flight())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
