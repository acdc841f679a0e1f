//! Task abstraction for the thread pool.

use std::fmt;

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// One unit of deferred work.
///
/// The argument given to [`Task::new`] is moved into the call and never
/// inspected by the pool. Whatever it refers to stays owned by the task body.
pub struct Task {
    action: BoxedTask,
}

impl Task {
    /// Pairs a plain function with the argument it will be called with.
    pub fn new<A>(action: fn(A), argument: A) -> Self
    where
        A: Send + 'static,
    {
        Self::from_fn(move || action(argument))
    }

    /// Wraps a closure as a task.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Box::new(f),
        }
    }

    /// Consumes the task, running its action on the calling thread.
    pub fn run(self) {
        (self.action)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
