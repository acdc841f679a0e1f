//! Metrics collection for the thread pool.
//!
//! This module defines the `MetricsCollector` trait for collecting metrics about the
//! thread pool's activity, as well as a default implementation backed by atomic counters.
//!
//! Queue-side hooks (`on_task_submitted`, `on_task_started`, `on_task_discarded`) are
//! invoked while the queue lock is held, so implementations must be quick and must
//! not call back into the pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A trait for collecting metrics from the thread pool.
///
/// Implementations of this trait provide hooks to track key events in the thread pool,
/// such as task submission, execution, and worker lifecycle changes.
pub trait MetricsCollector: Send + Sync {
    /// Called when a task is accepted into the queue.
    fn on_task_submitted(&self);
    /// Called when a worker claims a task.
    fn on_task_started(&self);
    /// Called when a task's action returns (or panics).
    fn on_task_completed(&self);
    /// Called for every queued task released without running during teardown.
    fn on_task_discarded(&self);
    /// Called when a worker thread starts.
    fn on_worker_started(&self);
    /// Called when a worker thread stops.
    fn on_worker_stopped(&self);
}

/// Stores metrics for the thread pool using atomic counters.
#[derive(Debug, Default)]
pub struct ThreadPoolMetrics {
    /// Number of tasks currently queued and not yet claimed.
    pub queued_tasks: AtomicUsize,
    /// Number of tasks currently being executed.
    pub running_tasks: AtomicUsize,
    /// Total number of tasks that have been completed.
    pub completed_tasks: AtomicUsize,
    /// Total number of tasks dropped unexecuted at teardown.
    pub discarded_tasks: AtomicUsize,
    /// Number of worker threads currently active.
    pub active_threads: AtomicUsize,
}

impl ThreadPoolMetrics {
    /// Creates a new `ThreadPoolMetrics` instance with all counters initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A default implementation of `MetricsCollector` using atomic counters.
///
/// Backed by an `Arc<ThreadPoolMetrics>` so the counters can be read while the
/// pool is running.
pub struct AtomicMetricsCollector {
    /// Shared metrics storage.
    pub metrics: Arc<ThreadPoolMetrics>,
}

impl AtomicMetricsCollector {
    /// Creates a new `AtomicMetricsCollector` writing into the provided metrics.
    ///
    /// # Arguments
    /// - `metrics`: An `Arc<ThreadPoolMetrics>` instance to store and share metrics.
    pub fn new(metrics: Arc<ThreadPoolMetrics>) -> Self {
        Self { metrics }
    }
}

impl MetricsCollector for AtomicMetricsCollector {
    /// Increments the count of queued tasks.
    fn on_task_submitted(&self) {
        self.metrics.queued_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves one task from queued to running.
    fn on_task_started(&self) {
        self.metrics.queued_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.running_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves one task from running to completed.
    fn on_task_completed(&self) {
        self.metrics.running_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.completed_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Moves one task from queued to discarded.
    fn on_task_discarded(&self) {
        self.metrics.queued_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.discarded_tasks.fetch_add(1, Ordering::SeqCst);
    }

    /// Increments the count of active threads.
    fn on_worker_started(&self) {
        self.metrics.active_threads.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrements the count of active threads.
    fn on_worker_stopped(&self) {
        self.metrics.active_threads.fetch_sub(1, Ordering::SeqCst);
    }
}
