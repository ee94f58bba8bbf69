//! Integration tests for pooled_httpd
//!
//! Each test binds its own listener on an ephemeral loopback port and talks
//! to it with plain `TcpStream`s, so no external server is needed.
//!
//! Run with: cargo test --test integration

mod helpers;

mod http_basic;
mod shutdown;
