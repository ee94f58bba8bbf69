//! pooled_httpd - minimal HTTP responder on a fixed pool of worker threads.
//!
//! A blocking accept loop hands every connection to a bounded set of
//! worker threads. Workers read one request line and answer with a
//! plain-text greeting. Shutdown is cooperative: the listening socket is
//! closed, every worker receives a terminate message after the work that
//! was already queued, and all workers are joined.
//!
//! # Modules
//!
//! - [`pool`] - `WorkerPool`, the poison-pill thread pool
//! - [`core`] - request line parsing, response encoding, handlers
//! - [`listener`] - listening socket, accept loop, shutdown
//! - [`config`] - environment configuration
//! - [`logging`] - tracing subscriber and JSON line format
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pooled_httpd::listener::Listener;
//!
//! let listener = Arc::new(Listener::new(3000, 4)?);
//! let acceptor = {
//!     let listener = Arc::clone(&listener);
//!     std::thread::spawn(move || listener.start())
//! };
//! // ... later, from any thread:
//! listener.shutdown()?;
//! acceptor.join().unwrap()?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), or empty when unknown
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod core;
pub mod listener;
pub mod logging;
pub mod pool;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{HelloHandler, RequestHandler};
pub use listener::{Listener, ListenerConfig, ListenerError};
pub use pool::{PoolError, WorkerPool};
