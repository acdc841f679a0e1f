//! # fifopool
//!
//! `fifopool` is a fixed-size worker thread pool fronted by a single FIFO task
//! queue.
//!
//! ## Features
//! - Submit closures, or a plain function plus an argument.
//! - Drain-wait: block until every queued task has run, keep the pool alive.
//! - Join-all: stop the workers after their current task, leave the backlog queued.
//! - Destroy: join the workers and release every unexecuted task.
//! - Metrics hooks for monitoring pool activity.
//!
//! Tasks are claimed in submission order. Completion order is not guaranteed,
//! since claimed tasks run concurrently on different workers.
//!
//! ## Usage
//!
//! ### Basic Usage
//! ```rust
//! use fifopool::ThreadPool;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let pool = ThreadPool::new(4).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..8 {
//!     let counter = Arc::clone(&counter);
//!     pool.spawn(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//! }
//!
//! pool.wait_all();
//! assert_eq!(counter.load(Ordering::SeqCst), 8);
//! pool.destroy();
//! ```
//!
//! ### Function plus argument
//! ```rust
//! use fifopool::{PoolError, ThreadPool};
//!
//! fn print_value(value: u32) {
//!     println!("got {}", value);
//! }
//!
//! let pool = ThreadPool::new(2).unwrap();
//! pool.submit(Some(print_value), 7).unwrap();
//!
//! let missing: Option<fn(u32)> = None;
//! assert!(matches!(pool.submit(missing, 7), Err(PoolError::InvalidArgument)));
//!
//! pool.wait_all();
//! pool.destroy();
//! ```
//!
//! ### Configuring the pool
//! ```rust
//! use fifopool::ThreadPoolBuilder;
//!
//! let pool = ThreadPoolBuilder::new()
//!     .num_threads(8)
//!     .thread_name("compute")
//!     .stack_size(256 * 1024)
//!     .build()
//!     .unwrap();
//!
//! pool.join_all();
//! assert!(!pool.is_running());
//! pool.destroy();
//! ```
//!
//! ### Collecting Metrics
//! ```rust
//! use fifopool::{metrics::{ThreadPoolMetrics, AtomicMetricsCollector}, ThreadPoolBuilder};
//! use std::sync::atomic::Ordering;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(ThreadPoolMetrics::new());
//! let collector = Arc::new(AtomicMetricsCollector::new(metrics.clone()));
//!
//! let pool = ThreadPoolBuilder::new()
//!     .num_threads(4)
//!     .with_metrics_collector(collector)
//!     .build()
//!     .unwrap();
//!
//! for i in 0..5 {
//!     pool.spawn(move || println!("Task {} executed", i)).unwrap();
//! }
//!
//! pool.wait_all();
//! assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 5);
//! pool.destroy();
//! ```

mod errors;
mod macros;
pub mod metrics;
pub mod pool;
mod queue;

pub use errors::PoolError;
pub use pool::task::Task;
pub use pool::{ThreadPool, ThreadPoolBuilder};

#[doc(hidden)]
pub use log as __log;
