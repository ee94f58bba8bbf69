//! Listener error types.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use crate::pool::PoolError;

/// Errors from building, running or stopping a [`Listener`](super::Listener).
#[derive(Debug)]
pub enum ListenerError {
    /// The listening socket could not be bound.
    Bind { addr: SocketAddr, source: io::Error },

    /// The worker pool could not be built or stopped.
    Pool(PoolError),

    /// `start` was called while already accepting, or after shutdown.
    NotListening,

    /// `shutdown` was called a second time.
    AlreadyShutdown,

    /// Other socket I/O error.
    Io(io::Error),
}

impl ListenerError {
    /// Whether this error happened while constructing the listener.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ListenerError::Bind { .. }
                | ListenerError::Pool(PoolError::InvalidSize(_) | PoolError::Spawn(_))
        )
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerError::Bind { addr, source } => {
                write!(f, "failed to bind {}: {}", addr, source)
            }
            ListenerError::Pool(e) => write!(f, "worker pool error: {}", e),
            ListenerError::NotListening => write!(f, "listener is not in a state to accept"),
            ListenerError::AlreadyShutdown => write!(f, "listener has already been shut down"),
            ListenerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind { source, .. } => Some(source),
            ListenerError::Pool(e) => Some(e),
            ListenerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for ListenerError {
    fn from(e: PoolError) -> Self {
        ListenerError::Pool(e)
    }
}

impl From<io::Error> for ListenerError {
    fn from(e: io::Error) -> Self {
        ListenerError::Io(e)
    }
}
