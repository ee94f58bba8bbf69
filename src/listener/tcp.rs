//! TCP socket setup for the listener.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

/// How long a wake-up connection may take before giving up.
const WAKE_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Create a blocking listening socket with SO_REUSEADDR and the given backlog.
pub fn bind_listener(addr: SocketAddr, backlog: i32) -> io::Result<TcpListener> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}

/// Apply per-connection socket options to an accepted stream.
///
/// Failures are logged, the connection is still served.
pub fn prepare_stream(stream: &TcpStream, timeout: Option<Duration>) {
    // Set TCP_NODELAY for lower latency
    if let Err(e) = stream.set_nodelay(true) {
        tracing::warn!(error = %e, "Failed to set TCP_NODELAY");
    }

    if let Err(e) = stream
        .set_read_timeout(timeout)
        .and_then(|_| stream.set_write_timeout(timeout))
    {
        tracing::warn!(error = %e, "Failed to set connection timeout");
    }
}

/// Address a local client can connect to in order to reach `local`.
///
/// A wildcard bind is reached through loopback of the same family.
pub fn wake_addr(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}

/// Unblock a thread parked in `accept` on `local` by connecting to it.
pub fn wake_acceptor(local: SocketAddr) -> io::Result<()> {
    TcpStream::connect_timeout(&wake_addr(local), WAKE_CONNECT_TIMEOUT).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_ephemeral_port() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = bind_listener(addr, 16).unwrap();

        let local_addr = listener.local_addr().unwrap();
        assert_eq!(local_addr.ip(), addr.ip());
        assert_ne!(local_addr.port(), 0);
    }

    #[test]
    fn test_bind_port_in_use() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let first = bind_listener(addr, 16).unwrap();
        let taken = first.local_addr().unwrap();

        assert!(bind_listener(taken, 16).is_err());
    }

    #[test]
    fn test_wake_addr_wildcard() {
        let v4: SocketAddr = "0.0.0.0:3000".parse().unwrap();
        assert_eq!(wake_addr(v4), "127.0.0.1:3000".parse().unwrap());

        let v6: SocketAddr = "[::]:3000".parse().unwrap();
        assert_eq!(wake_addr(v6), "[::1]:3000".parse().unwrap());

        let fixed: SocketAddr = "192.0.2.1:80".parse().unwrap();
        assert_eq!(wake_addr(fixed), fixed);
    }

    #[test]
    fn test_wake_acceptor_unblocks_accept() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = bind_listener(addr, 16).unwrap();
        let local = listener.local_addr().unwrap();

        let acceptor = std::thread::spawn(move || listener.accept().map(|(_, peer)| peer));
        wake_acceptor(local).unwrap();

        assert!(acceptor.join().unwrap().is_ok());
    }

    #[test]
    fn test_prepare_stream_sets_timeouts() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = bind_listener(addr, 16).unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (stream, _) = listener.accept().unwrap();

        prepare_stream(&stream, Some(Duration::from_secs(5)));
        assert_eq!(stream.read_timeout().unwrap(), Some(Duration::from_secs(5)));
        assert_eq!(stream.write_timeout().unwrap(), Some(Duration::from_secs(5)));
        assert!(stream.nodelay().unwrap());
        drop(client);
    }
}
