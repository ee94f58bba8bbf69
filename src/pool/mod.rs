//! Fixed-size worker pool.
//!
//! A pool owns N long-lived worker threads that consume units of work
//! from one shared FIFO queue. Shutdown reuses the queue itself: one
//! `Terminate` message (poison pill) is enqueued per worker, and each
//! worker exits after drawing exactly one.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      WorkerPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐                 │
//! │  │ Worker0 │    │ Worker1 │    │ Worker2 │  ...            │
//! │  └────┬────┘    └────┬────┘    └────┬────┘                 │
//! │       │              │              │                      │
//! │       └──────────────┴──────────────┘                      │
//! │                      │  recv (one at a time)               │
//! │              ┌───────▼───────┐                             │
//! │              │  mpsc channel │  Run(unit) | Terminate      │
//! │              └───────▲───────┘                             │
//! │                      │                                     │
//! │              ┌───────┴───────┐                             │
//! │              │   submit()    │  rejected after shutdown()  │
//! │              └───────────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod thread;

pub use error::{PoolError, PoolResult};
pub use thread::WorkerPool;

use serde::Serialize;

/// An opaque, zero-argument action run once by some worker.
pub type WorkUnit = Box<dyn FnOnce() + Send + 'static>;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Configured number of workers.
    pub workers: usize,
    /// Workers whose thread is still running its loop.
    pub live_workers: usize,
    /// Units queued but not yet picked up.
    pub pending: usize,
    /// Units currently executing.
    pub active: usize,
    /// Units accepted by `submit`.
    pub submitted: u64,
    /// Units that ran to completion (including those that panicked).
    pub completed: u64,
    /// Units that panicked.
    pub panicked: u64,
    /// Units rejected by `submit`.
    pub rejected: u64,
    /// Queue bound, `None` when unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_unbounded() {
        let stats = PoolStats {
            workers: 4,
            live_workers: 4,
            submitted: 10,
            completed: 10,
            ..Default::default()
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["workers"], 4);
        assert_eq!(json["completed"], 10);
        assert!(json.get("queue_capacity").is_none());
    }

    #[test]
    fn test_stats_serialize_bounded() {
        let stats = PoolStats {
            queue_capacity: Some(16),
            ..Default::default()
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["queue_capacity"], 16);
    }
}
