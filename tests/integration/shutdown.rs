//! Shutdown behaviour of a running server.

use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pooled_httpd::core::{respond, Outcome, Result as RequestResult};
use pooled_httpd::listener::ListenerError;

use crate::helpers::*;

#[test]
fn test_shutdown_closes_listening_socket() {
    let server = TestServer::start(2);
    let addr = server.addr;

    assert!(!send_raw(addr, b"GET /x HTTP/1.1\r\n").is_empty());
    assert!(server.stop().is_ok());

    assert!(TcpStream::connect(addr).is_err());
}

#[test]
fn test_shutdown_joins_all_workers() {
    let server = TestServer::start(4);
    server.send_str("GET / HTTP/1.1\r\n");

    let listener = Arc::clone(&server.listener);
    server.stop().unwrap();

    let stats = listener.stats();
    assert_eq!(stats.live_workers, 0);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.completed, stats.submitted);
}

#[test]
fn test_second_shutdown_reports_error() {
    let server = TestServer::start(1);
    server.listener.shutdown().unwrap();

    assert!(matches!(
        server.listener.shutdown(),
        Err(ListenerError::AlreadyShutdown)
    ));
}

#[test]
fn test_in_flight_requests_finish_before_shutdown_returns() {
    let served = Arc::new(AtomicUsize::new(0));
    let handler = {
        let served = Arc::clone(&served);
        move |stream: TcpStream, _peer: SocketAddr| -> RequestResult<Outcome> {
            thread::sleep(Duration::from_millis(100));
            let outcome = respond(stream);
            served.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    };
    let server = TestServer::with_handler(config(2), handler);
    let addr = server.addr;

    let clients: Vec<_> = (0..4)
        .map(|_| thread::spawn(move || send_raw(addr, b"GET /slow HTTP/1.1\r\n")))
        .collect();

    // Let the accept loop pick all four up before stopping
    while server.listener.stats().submitted < 4 {
        thread::sleep(Duration::from_millis(5));
    }
    server.stop().unwrap();

    assert_eq!(served.load(Ordering::SeqCst), 4);
    for client in clients {
        let body = String::from_utf8(client.join().unwrap()).unwrap();
        assert_eq!(body, hello_response("/slow"));
    }
}
