//! Request handling error types.

use std::fmt;
use std::io;

/// Errors raised while serving a single connection.
///
/// These never leave the work unit that owns the connection: they are
/// logged and the connection is closed.
#[derive(Debug)]
pub enum RequestError {
    /// The request line could not be understood.
    Malformed(String),

    /// The peer did not send or accept data within the configured timeout.
    Timeout,

    /// I/O error (peer reset, broken pipe, ...).
    Io(io::Error),
}

impl RequestError {
    /// Short message for log lines.
    pub fn message(&self) -> &'static str {
        match self {
            RequestError::Malformed(_) => "Malformed request",
            RequestError::Timeout => "Request timeout",
            RequestError::Io(_) => "I/O error",
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Malformed(msg) => write!(f, "malformed request: {}", msg),
            RequestError::Timeout => write!(f, "request timed out"),
            RequestError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RequestError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Socket read/write timeouts surface as one of these depending on the OS
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => RequestError::Timeout,
            _ => RequestError::Io(e),
        }
    }
}

/// Result type alias for request handling.
pub type Result<T> = std::result::Result<T, RequestError>;
