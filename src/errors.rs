//! Error types for the thread pool.
//!
//! This module defines errors that may occur while constructing the pool or
//! submitting work to it. Shutdown operations never fail and have no error type.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Represents errors that can occur in the thread pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A task was submitted without an action to run.
    #[error("Task has no action to execute")]
    InvalidArgument,
    /// The worker handle collection or a queue slot could not be allocated.
    #[error("Out of memory while allocating pool resources")]
    OutOfMemory,
    /// The platform refused to create a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
    /// The thread pool has been shut down, and no new tasks can be accepted.
    #[error("Thread pool is shut down")]
    PoolShutdown,
}

impl PoolError {
    /// Returns the OS error code behind a [`PoolError::Spawn`] failure, if the
    /// platform reported one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            PoolError::Spawn(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

impl From<TryReserveError> for PoolError {
    fn from(_: TryReserveError) -> Self {
        PoolError::OutOfMemory
    }
}
