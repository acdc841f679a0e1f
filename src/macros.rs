//! # Macros for `fifopool`
//!
//! Shorthands for building pools, submitting work and logging metrics.

/// Submits a closure, or a function plus its argument, to the pool.
///
/// # Examples
/// ```rust
/// use fifopool::{submit_task, ThreadPool};
///
/// fn greet(name: &'static str) {
///     println!("hello, {}", name);
/// }
///
/// let pool = ThreadPool::new(2).unwrap();
/// submit_task!(pool, || println!("closure task")).unwrap();
/// submit_task!(pool, greet, "pool").unwrap();
/// pool.wait_all();
/// pool.destroy();
/// ```
#[macro_export]
macro_rules! submit_task {
    ($pool:expr, $task:expr) => {
        $pool.spawn($task)
    };
    ($pool:expr, $action:expr, $argument:expr) => {
        $pool.submit(Some($action), $argument)
    };
}

/// Logs the current metrics of the thread pool at `info` level.
///
/// # Example
/// ```rust
/// use fifopool::{metrics::{ThreadPoolMetrics, AtomicMetricsCollector}, ThreadPoolBuilder, log_metrics};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(ThreadPoolMetrics::new());
/// let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
/// let pool = ThreadPoolBuilder::new().with_metrics_collector(collector).build().unwrap();
///
/// log_metrics!(metrics);
/// pool.destroy();
/// ```
#[macro_export]
macro_rules! log_metrics {
    ($metrics:expr) => {
        $crate::__log::info!(
            "queued: {}, running: {}, completed: {}, discarded: {}, active threads: {}",
            $metrics
                .queued_tasks
                .load(::std::sync::atomic::Ordering::SeqCst),
            $metrics
                .running_tasks
                .load(::std::sync::atomic::Ordering::SeqCst),
            $metrics
                .completed_tasks
                .load(::std::sync::atomic::Ordering::SeqCst),
            $metrics
                .discarded_tasks
                .load(::std::sync::atomic::Ordering::SeqCst),
            $metrics
                .active_threads
                .load(::std::sync::atomic::Ordering::SeqCst)
        )
    };
}

/// Creates a thread pool, returning `Result<ThreadPool, PoolError>`.
///
/// # Examples
/// ```rust
/// use fifopool::create_thread_pool;
///
/// let pool = create_thread_pool!(num_threads: 8, name: "io").unwrap();
/// pool.destroy();
/// ```
#[macro_export]
macro_rules! create_thread_pool {
    (num_threads: $num:expr) => {
        $crate::ThreadPoolBuilder::new().num_threads($num).build()
    };
    (num_threads: $num:expr, name: $name:expr) => {
        $crate::ThreadPoolBuilder::new()
            .num_threads($num)
            .thread_name($name)
            .build()
    };
}
