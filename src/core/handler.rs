//! The request handler seam between the listener and the protocol.

use std::io::{BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};

use http::StatusCode;

use super::error::Result;
use super::request::{read_request_line, RequestLine};
use super::response::Response;

/// What happened on a connection that was served without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The peer closed before sending a request line; nothing was written.
    NoRequest,
    /// One response was written.
    Responded {
        method: String,
        path: String,
        status: StatusCode,
    },
}

/// Serves one accepted connection.
///
/// The handler owns the stream; it is closed when the handler returns,
/// whatever the result.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, stream: TcpStream, peer: SocketAddr) -> Result<Outcome>;
}

impl<F> RequestHandler for F
where
    F: Fn(TcpStream, SocketAddr) -> Result<Outcome> + Send + Sync + 'static,
{
    fn handle(&self, stream: TcpStream, peer: SocketAddr) -> Result<Outcome> {
        self(stream, peer)
    }
}

/// Answers `GET <path>` with a greeting and everything else with 405.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloHandler;

impl RequestHandler for HelloHandler {
    fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> Result<Outcome> {
        respond(&mut stream)
    }
}

/// Read one request line from `stream` and write at most one response.
pub fn respond<S: Read + Write>(mut stream: S) -> Result<Outcome> {
    let line = {
        let mut reader = BufReader::new(&mut stream);
        read_request_line(&mut reader)?
    };

    let Some(line) = line else {
        return Ok(Outcome::NoRequest);
    };

    let request = RequestLine::parse(&line);
    let response = if request.is_get() {
        Response::hello(request.path())
    } else {
        Response::method_not_allowed()
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    Ok(Outcome::Responded {
        method: request.method().to_string(),
        path: request.path().to_string(),
        status: response.status(),
    })
}
