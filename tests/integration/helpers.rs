//! Test helpers and utilities

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pooled_httpd::core::{HelloHandler, RequestHandler};
use pooled_httpd::listener::{Listener, ListenerConfig, ListenerError};

/// In-process server running its accept loop on a background thread.
pub struct TestServer {
    pub listener: Arc<Listener>,
    pub addr: SocketAddr,
    acceptor: Option<JoinHandle<Result<(), ListenerError>>>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a [`HelloHandler`] server with `workers` threads.
    pub fn start(workers: usize) -> Self {
        Self::with_handler(config(workers), HelloHandler)
    }

    /// Start a server with a custom configuration and handler.
    pub fn with_handler<H: RequestHandler>(config: ListenerConfig, handler: H) -> Self {
        let listener = Arc::new(Listener::bind(config, handler).expect("Failed to bind listener"));
        let addr = listener.local_addr();

        let acceptor = {
            let listener = Arc::clone(&listener);
            thread::Builder::new()
                .name("test-acceptor".into())
                .spawn(move || listener.start())
                .expect("Failed to spawn acceptor")
        };

        Self {
            listener,
            addr,
            acceptor: Some(acceptor),
        }
    }

    /// Send `request` verbatim and read until the server closes the connection.
    pub fn send(&self, request: &[u8]) -> Vec<u8> {
        send_raw(self.addr, request)
    }

    /// Send `request` and decode the reply as UTF-8.
    pub fn send_str(&self, request: &str) -> String {
        String::from_utf8(self.send(request.as_bytes())).expect("Response is not UTF-8")
    }

    /// Shut down and return the accept loop's result.
    pub fn stop(mut self) -> Result<(), ListenerError> {
        self.listener.shutdown()?;
        self.join_acceptor()
    }

    fn join_acceptor(&mut self) -> Result<(), ListenerError> {
        match self.acceptor.take() {
            Some(handle) => handle.join().expect("Acceptor thread panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.acceptor.is_some() {
            let _ = self.listener.shutdown();
            let _ = self.join_acceptor();
        }
    }
}

/// Loopback configuration with a short request timeout.
pub fn config(workers: usize) -> ListenerConfig {
    ListenerConfig::new(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
        .with_pool_size(workers)
        .with_request_timeout(Some(Duration::from_secs(2)))
}

/// Connect, write `request`, read the full reply.
pub fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("Failed to connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("Failed to set read timeout");
    stream.write_all(request).expect("Failed to write request");

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .expect("Failed to read response");
    response
}

/// Expected bytes for a 200 greeting.
pub fn hello_response(path: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nHello from {}!",
        path
    )
}

/// Expected bytes for a 405.
pub const METHOD_NOT_ALLOWED: &str =
    "HTTP/1.1 405 Method Not Allowed\r\nContent-Type: text/plain\r\n\r\nMethod Not Allowed";
