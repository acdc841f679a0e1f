//! Worker logic for the thread pool

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::{debug, error, trace, warn};

use crate::errors::PoolError;
use crate::metrics::MetricsCollector;
use crate::queue::TaskQueue;

pub struct WorkerHandle {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn new(id: usize, thread: thread::JoinHandle<()>) -> Self {
        Self {
            id,
            thread: Some(thread),
        }
    }

    /// Waits for the worker to exit.
    ///
    /// When called from the worker's own thread (a task dropped the last pool
    /// handle) the handle is released instead; that worker exits on its own
    /// once its current task returns.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.thread().id() == thread::current().id() {
                debug!("worker {} is tearing down its own pool, not joining", self.id);
                return;
            }
            if handle.join().is_err() {
                warn!("worker {} terminated abnormally", self.id);
            }
        }
    }
}

/// Spawns one worker thread running [`worker_loop`].
pub(crate) fn spawn_worker(
    id: usize,
    builder: thread::Builder,
    queue: Arc<TaskQueue>,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
) -> io::Result<WorkerHandle> {
    let handle = builder.spawn(move || worker_loop(id, queue, metrics_collector))?;
    Ok(WorkerHandle::new(id, handle))
}

/// Worker thread main loop
///
/// Claims tasks until the queue stops running. A worker that observes shutdown
/// after finishing a task exits without looking at the queue again.
pub(crate) fn worker_loop(
    id: usize,
    queue: Arc<TaskQueue>,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
) {
    debug!("worker {} started", id);

    while let Some(task) = queue.next_task() {
        trace!("worker {} claimed a task", id);

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
            error!("task panicked on worker {}: {}", id, panic_message(&*payload));
        }

        // Report before `complete` so drain waiters see up-to-date counters.
        if let Some(m) = &metrics_collector {
            m.on_task_completed();
        }
        queue.complete();

        if !queue.is_running() {
            break;
        }
    }

    if let Some(m) = &metrics_collector {
        m.on_worker_stopped();
    }
    debug!("worker {} stopped", id);
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// Owns workers while a pool is being built.
///
/// If construction bails out before [`SpawnGuard::finish`], dropping the guard
/// stops the queue and joins every thread spawned so far.
pub(crate) struct SpawnGuard {
    queue: Arc<TaskQueue>,
    workers: Vec<WorkerHandle>,
}

impl SpawnGuard {
    pub fn new(queue: Arc<TaskQueue>, capacity: usize) -> Result<Self, PoolError> {
        let mut workers = Vec::new();
        workers.try_reserve_exact(capacity)?;
        Ok(Self { queue, workers })
    }

    pub fn push(&mut self, worker: WorkerHandle) {
        self.workers.push(worker);
    }

    pub fn finish(mut self) -> Vec<WorkerHandle> {
        std::mem::take(&mut self.workers)
    }
}

impl Drop for SpawnGuard {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        debug!(
            "pool construction failed, stopping {} spawned workers",
            self.workers.len()
        );
        self.queue.shutdown();
        for worker in &mut self.workers {
            worker.join();
        }
    }
}
