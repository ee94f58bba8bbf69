//! Worker pool error types.

use std::fmt;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool was asked for fewer than one worker.
    InvalidSize(usize),

    /// A worker thread could not be spawned.
    Spawn(String),

    /// The pool has been shut down (or is shutting down).
    Shutdown,

    /// The bounded work queue is full.
    QueueFull {
        /// Maximum queue capacity.
        capacity: usize,
        /// Units waiting when the submit was rejected.
        pending: usize,
    },

    /// Every worker is gone and the queue can no longer be drained.
    ChannelClosed,
}

impl PoolError {
    /// Check if this is a shutdown error.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, PoolError::Shutdown)
    }

    /// Check if this is a queue full error.
    pub fn is_queue_full(&self) -> bool {
        matches!(self, PoolError::QueueFull { .. })
    }

    /// Short message for log lines.
    pub fn message(&self) -> &'static str {
        match self {
            PoolError::InvalidSize(_) => "Invalid pool size",
            PoolError::Spawn(_) => "Worker spawn failed",
            PoolError::Shutdown => "Pool shutdown",
            PoolError::QueueFull { .. } => "Queue full",
            PoolError::ChannelClosed => "Channel closed",
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidSize(size) => {
                write!(f, "pool size must be at least 1, got {}", size)
            }
            PoolError::Spawn(msg) => {
                write!(f, "failed to spawn worker thread: {}", msg)
            }
            PoolError::Shutdown => {
                write!(f, "pool has been shut down")
            }
            PoolError::QueueFull { capacity, pending } => {
                write!(f, "queue full: {}/{} pending units", pending, capacity)
            }
            PoolError::ChannelClosed => {
                write!(f, "work queue closed unexpectedly")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
