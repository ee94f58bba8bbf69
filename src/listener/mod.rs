//! Listening socket and accept loop.
//!
//! The [`Listener`] owns a blocking TCP listening socket and a
//! [`WorkerPool`](crate::pool::WorkerPool). Every accepted connection is
//! wrapped in one unit of work that runs the request handler.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Listener                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │   start()  ── accept ──► unit { handler(stream) } ──┐       │
//! │      ▲                                              │       │
//! │      │ wake-up connect                              ▼       │
//! │   shutdown() ─────────────────────────────► WorkerPool      │
//! │      1. stop accepting, close socket        2. drain, join  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod acceptor;
mod error;
mod tcp;

pub use acceptor::Listener;
pub use error::ListenerError;
pub use tcp::{bind_listener, wake_addr};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 3000;

/// Workers used when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Read/write timeout applied to each accepted connection.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// listen(2) backlog.
pub const DEFAULT_BACKLOG: i32 = 1024;

/// Configuration for creating a [`Listener`].
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
    /// Number of worker threads.
    pub pool_size: usize,
    /// Work queue bound (0 = unbounded).
    pub queue_capacity: usize,
    /// Per-connection read/write timeout (`None` = wait forever).
    pub request_timeout: Option<Duration>,
    /// listen(2) backlog.
    pub backlog: i32,
}

impl ListenerConfig {
    /// Create a configuration for `addr` with default pool and timeouts.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            pool_size: DEFAULT_POOL_SIZE,
            queue_capacity: 0,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            backlog: DEFAULT_BACKLOG,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            DEFAULT_PORT,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_config_defaults() {
        let config = ListenerConfig::default();

        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.queue_capacity, 0);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_listener_config_builders() {
        let config = ListenerConfig::default()
            .with_port(8080)
            .with_pool_size(8)
            .with_queue_capacity(64)
            .with_request_timeout(None)
            .with_backlog(128);

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.queue_capacity, 64);
        assert!(config.request_timeout.is_none());
        assert_eq!(config.backlog, 128);
    }
}
