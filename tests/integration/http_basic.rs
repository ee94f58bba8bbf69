//! Basic request/response tests over real sockets.

use std::io::Write;
use std::net::TcpStream;
use std::thread;

use crate::helpers::*;

#[test]
fn test_get_returns_greeting() {
    let server = TestServer::start(2);

    let resp = server.send_str("GET /foo HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp, hello_response("/foo"));
}

#[test]
fn test_get_root() {
    let server = TestServer::start(1);
    assert_eq!(server.send_str("GET / HTTP/1.1\r\n"), hello_response("/"));
}

#[test]
fn test_post_is_method_not_allowed() {
    let server = TestServer::start(2);

    let resp = server.send_str("POST /foo HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
    assert_eq!(resp, METHOD_NOT_ALLOWED);
}

#[test]
fn test_lowercase_get_is_not_get() {
    let server = TestServer::start(1);
    assert_eq!(server.send_str("get /foo HTTP/1.1\r\n"), METHOD_NOT_ALLOWED);
}

#[test]
fn test_path_is_echoed_verbatim() {
    let server = TestServer::start(1);

    let resp = server.send_str("GET /a/b?c=d%20e HTTP/1.1\r\n");
    assert_eq!(resp, hello_response("/a/b?c=d%20e"));
}

#[test]
fn test_empty_connection_gets_no_bytes() {
    let server = TestServer::start(2);

    // Connect and half-close without sending anything
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();
    let mut buf = Vec::new();
    std::io::Read::read_to_end(&mut stream, &mut buf).unwrap();
    assert!(buf.is_empty());

    // Server keeps working afterwards
    assert_eq!(server.send_str("GET /after HTTP/1.1\r\n"), hello_response("/after"));
}

#[test]
fn test_oversized_request_line_gets_no_response() {
    let server = TestServer::start(1);

    let mut request = b"GET /".to_vec();
    request.extend(std::iter::repeat(b'a').take(pooled_httpd::core::MAX_REQUEST_LINE));
    request.extend_from_slice(b" HTTP/1.1\r\n");

    // Unread bytes may turn the close into a reset; either way nothing is sent back
    let mut stream = TcpStream::connect(server.addr).unwrap();
    let _ = stream.write_all(&request);
    let mut buf = Vec::new();
    if std::io::Read::read_to_end(&mut stream, &mut buf).is_ok() {
        assert!(buf.is_empty());
    }

    assert_eq!(server.send_str("GET /ok HTTP/1.1\r\n"), hello_response("/ok"));
}

#[test]
fn test_concurrent_clients_all_answered() {
    let server = TestServer::start(4);
    let addr = server.addr;

    let clients: Vec<_> = (0..32)
        .map(|i| {
            thread::spawn(move || {
                let path = format!("/client/{}", i);
                let resp = send_raw(addr, format!("GET {} HTTP/1.1\r\n\r\n", path).as_bytes());
                assert_eq!(String::from_utf8(resp).unwrap(), hello_response(&path));
            })
        })
        .collect();

    for client in clients {
        client.join().unwrap();
    }

    let stats = server.listener.stats();
    assert_eq!(stats.workers, 4);
    assert!(stats.submitted >= 32);
}

#[test]
fn test_slow_client_is_timed_out() {
    let config = config(1).with_request_timeout(Some(std::time::Duration::from_millis(200)));
    let server = TestServer::with_handler(config, pooled_httpd::core::HelloHandler);

    // Partial line, never terminated
    let mut stalled = TcpStream::connect(server.addr).unwrap();
    stalled.write_all(b"GET /slo").unwrap();

    // The single worker frees up once the read times out
    assert_eq!(server.send_str("GET /next HTTP/1.1\r\n"), hello_response("/next"));
}
