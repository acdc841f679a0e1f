pub mod task;
mod worker;

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::errors::PoolError;
use crate::metrics::MetricsCollector;
use crate::queue::TaskQueue;
use task::Task;
use worker::{spawn_worker, SpawnGuard, WorkerHandle};

const DEFAULT_NUM_THREADS: usize = 4;
const DEFAULT_THREAD_NAME: &str = "fifopool-worker";

/// A fixed-size pool of worker threads fed from one FIFO queue.
///
/// Submission order determines claim order, not completion order: a worker
/// runs its claimed task outside the queue lock, so a later task claimed by
/// another worker may finish first.
pub struct ThreadPool {
    queue: Arc<TaskQueue>,
    workers: Mutex<Vec<WorkerHandle>>,
    num_threads: usize,
    torn_down: bool,
}

impl ThreadPool {
    /// Builds a pool of `num_threads` workers with default settings.
    pub fn new(num_threads: usize) -> Result<Self, PoolError> {
        ThreadPoolBuilder::new().num_threads(num_threads).build()
    }

    /// Returns a [`ThreadPoolBuilder`] with default settings.
    pub fn builder() -> ThreadPoolBuilder {
        ThreadPoolBuilder::new()
    }

    /// Queues `action(argument)` for execution on a worker.
    ///
    /// Returns [`PoolError::InvalidArgument`] when `action` is `None`; the
    /// queue is left untouched in that case.
    pub fn submit<A>(&self, action: Option<fn(A)>, argument: A) -> Result<(), PoolError>
    where
        A: Send + 'static,
    {
        let action = action.ok_or(PoolError::InvalidArgument)?;
        self.submit_task(Task::new(action, argument))
    }

    /// Queues a closure for execution on a worker.
    pub fn spawn<F>(&self, f: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit_task(Task::from_fn(f))
    }

    /// Queues a prebuilt [`Task`].
    ///
    /// Fails with [`PoolError::PoolShutdown`] once `join_all` or teardown has
    /// begun, and with [`PoolError::OutOfMemory`] if the queue cannot grow.
    pub fn submit_task(&self, task: Task) -> Result<(), PoolError> {
        self.queue.push(task).map_err(|err| {
            warn!("task rejected: {}", err);
            err
        })
    }

    /// Blocks until every queued task has been executed. The pool keeps
    /// running afterwards.
    ///
    /// Tasks submitted while waiting extend the wait. On a pool with zero
    /// workers this never returns while tasks are queued.
    pub fn wait_all(&self) {
        self.queue.wait_drained();
    }

    /// Stops the pool and joins every worker.
    ///
    /// Each worker finishes the task it already claimed, if any, and then
    /// exits. Tasks still queued are not executed; they stay in the queue
    /// until [`ThreadPool::destroy`] (or drop) releases them.
    ///
    /// Called from inside a task running on this pool, every other worker is
    /// joined and the calling worker exits after that task returns.
    pub fn join_all(&self) {
        if self.queue.shutdown() {
            info!(
                "shutting down pool, {} queued tasks will not run",
                self.queue.queued_len()
            );
        }
        let mut workers = self.workers.lock();
        for worker in workers.iter_mut() {
            worker.join();
        }
        workers.clear();
    }

    /// Stops and joins every worker, then drops all unexecuted tasks.
    pub fn destroy(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.join_all();
        let discarded = self.queue.take_unclaimed();
        info!("pool destroyed, {} unexecuted tasks discarded", discarded.len());
        drop(discarded);
    }

    /// Tasks queued plus tasks currently executing.
    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    /// Tasks queued and not yet claimed by any worker.
    pub fn queued_len(&self) -> usize {
        self.queue.queued_len()
    }

    /// `false` once shutdown has begun. Never becomes `true` again.
    pub fn is_running(&self) -> bool {
        self.queue.is_running()
    }

    /// Number of workers the pool was built with.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("num_threads", &self.num_threads)
            .field("running", &self.is_running())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Configures and builds a [`ThreadPool`].
pub struct ThreadPoolBuilder {
    num_threads: usize,
    thread_name: String,
    stack_size: Option<usize>,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
    #[cfg(test)]
    fail_spawn_at: Option<usize>,
}

impl Default for ThreadPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadPoolBuilder {
    /// Four workers named `fifopool-worker-{index}`, platform stack size, no metrics.
    pub fn new() -> Self {
        Self {
            num_threads: DEFAULT_NUM_THREADS,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
            metrics_collector: None,
            #[cfg(test)]
            fail_spawn_at: None,
        }
    }

    /// Sets the number of workers. Zero is accepted: such a pool queues
    /// submissions but never runs them.
    pub fn num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    /// Prefix for worker thread names; workers are named `"{prefix}-{index}"`.
    ///
    /// A prefix containing a NUL byte makes `build` fail with
    /// [`PoolError::InvalidArgument`].
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Stack size in bytes for each worker thread. Defaults to the platform's.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Installs hooks notified of task and worker lifecycle events.
    pub fn with_metrics_collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.metrics_collector = Some(collector);
        self
    }

    /// Spawns the workers.
    ///
    /// If any worker fails to spawn, the ones already started are stopped and
    /// joined before the error is returned.
    pub fn build(self) -> Result<ThreadPool, PoolError> {
        if self.thread_name.contains('\0') {
            return Err(PoolError::InvalidArgument);
        }
        if self.num_threads == 0 {
            warn!("building a pool with zero workers, submitted tasks will never run");
        }

        let queue = Arc::new(TaskQueue::new(self.metrics_collector.clone()));
        let mut guard = SpawnGuard::new(Arc::clone(&queue), self.num_threads)?;

        for i in 0..self.num_threads {
            let mut builder =
                thread::Builder::new().name(format!("{}-{}", self.thread_name, i));
            if let Some(size) = self.stack_size {
                builder = builder.stack_size(size);
            }

            let worker = self
                .spawn_one(i, builder, Arc::clone(&queue))
                .map_err(PoolError::Spawn)?;
            guard.push(worker);

            if let Some(m) = &self.metrics_collector {
                m.on_worker_started();
            }
        }

        debug!("pool started with {} workers", self.num_threads);
        Ok(ThreadPool {
            queue,
            workers: Mutex::new(guard.finish()),
            num_threads: self.num_threads,
            torn_down: false,
        })
    }

    #[cfg(not(test))]
    fn spawn_one(
        &self,
        id: usize,
        builder: thread::Builder,
        queue: Arc<TaskQueue>,
    ) -> io::Result<WorkerHandle> {
        spawn_worker(id, builder, queue, self.metrics_collector.clone())
    }

    #[cfg(test)]
    fn spawn_one(
        &self,
        id: usize,
        builder: thread::Builder,
        queue: Arc<TaskQueue>,
    ) -> io::Result<WorkerHandle> {
        if self.fail_spawn_at == Some(id) {
            return Err(io::Error::from_raw_os_error(11));
        }
        spawn_worker(id, builder, queue, self.metrics_collector.clone())
    }
}
