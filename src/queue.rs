//! Shared FIFO task queue with blocking hand-off to workers.
//!
//! All queue mutation happens under one mutex. Workers park on
//! `work_available`; drain waiters park on `drained`. Every wait re-checks its
//! own predicate after waking, so spurious or misdirected wakeups are harmless.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::trace;
use parking_lot::{Condvar, Mutex};

use crate::errors::PoolError;
use crate::metrics::MetricsCollector;
use crate::pool::task::Task;

struct QueueState {
    tasks: VecDeque<Task>,
    // Claimed by a worker but not yet returned.
    in_flight: usize,
}

impl QueueState {
    fn pending(&self) -> usize {
        self.tasks.len() + self.in_flight
    }
}

pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    // Only ever stored while `state` is locked, so a waiter that checked it
    // under the lock cannot miss the shutdown broadcast.
    running: AtomicBool,
    work_available: Condvar,
    drained: Condvar,
    metrics_collector: Option<Arc<dyn MetricsCollector>>,
}

impl TaskQueue {
    pub fn new(metrics_collector: Option<Arc<dyn MetricsCollector>>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                in_flight: 0,
            }),
            running: AtomicBool::new(true),
            work_available: Condvar::new(),
            drained: Condvar::new(),
            metrics_collector,
        }
    }

    /// Appends a task at the tail and wakes one idle worker.
    pub fn push(&self, task: Task) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if !self.running.load(Ordering::Relaxed) {
            return Err(PoolError::PoolShutdown);
        }
        state.tasks.try_reserve(1)?;
        state.tasks.push_back(task);
        if let Some(m) = &self.metrics_collector {
            m.on_task_submitted();
        }
        trace!("task enqueued, {} pending", state.pending());
        self.work_available.notify_one();
        Ok(())
    }

    /// Blocks until a task can be claimed or the queue stops running.
    ///
    /// Returns `None` once shutdown has begun, even if tasks are still queued.
    /// A claimed task counts as pending until [`TaskQueue::complete`] is called.
    pub fn next_task(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if !self.running.load(Ordering::Relaxed) {
                return None;
            }
            if let Some(task) = state.tasks.pop_front() {
                state.in_flight += 1;
                if let Some(m) = &self.metrics_collector {
                    m.on_task_started();
                }
                return Some(task);
            }
            self.work_available.wait(&mut state);
        }
    }

    /// Marks one claimed task as finished.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.in_flight -= 1;
        if self.is_drained(&state) {
            self.drained.notify_all();
        }
    }

    /// Blocks until no task is queued or executing.
    ///
    /// After shutdown, queued tasks can never be claimed, so only the tasks
    /// already executing are waited for.
    pub fn wait_drained(&self) {
        let mut state = self.state.lock();
        while !self.is_drained(&state) {
            self.drained.wait(&mut state);
        }
    }

    fn is_drained(&self, state: &QueueState) -> bool {
        state.in_flight == 0
            && (state.tasks.is_empty() || !self.running.load(Ordering::Relaxed))
    }

    /// Flips the queue to stopped and wakes every waiter. Returns `true` only
    /// for the call that performed the transition.
    pub fn shutdown(&self) -> bool {
        let _state = self.state.lock();
        let was_running = self.running.swap(false, Ordering::Release);
        self.work_available.notify_all();
        self.drained.notify_all();
        was_running
    }

    /// Unlinks every unclaimed task. The caller drops them outside the lock.
    pub fn take_unclaimed(&self) -> VecDeque<Task> {
        let mut state = self.state.lock();
        let tasks = std::mem::take(&mut state.tasks);
        if let Some(m) = &self.metrics_collector {
            for _ in 0..tasks.len() {
                m.on_task_discarded();
            }
        }
        tasks
    }

    /// Unsynchronized read of the running flag. The flag only ever goes from
    /// `true` to `false`, so a stale `true` merely costs one more loop turn.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending()
    }

    pub fn queued_len(&self) -> usize {
        self.state.lock().tasks.len()
    }
}
