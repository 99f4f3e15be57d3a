// Listener module
// Creates the TCP listener; a failed bind is reported, never retried

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::error::{Result, ServeError};

const LISTEN_BACKLOG: i32 = 128;

/// Create a `TcpListener` bound to `addr`.
///
/// `SO_REUSEADDR` is set on Unix so a restart is not blocked by sockets in
/// `TIME_WAIT`; it does not allow binding over a live listener. `SO_REUSEPORT`
/// stays off, so a second server on the same port fails.
///
/// Must be called inside a Tokio runtime.
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener> {
    bind(addr).map_err(|source| ServeError::BindFailure { addr, source })
}

fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    // Create socket with appropriate domain (IPv4 or IPv6)
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    #[cfg(unix)]
    socket.set_reuse_address(true)?;

    // Set non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    // Convert socket2::Socket to std::net::TcpListener, then to tokio::net::TcpListener
    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
