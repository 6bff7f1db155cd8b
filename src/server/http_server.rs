use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Wrapper around may_minihttp's HTTP server
///
/// Provides a typed interface for starting and managing HTTP servers.
/// Uses 32 max headers (Standard) to handle modern browser/proxy traffic.
pub struct HttpServer<T>(pub T);

/// How a listener coroutine ended when it was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The accept loop returned on its own.
    Finished,
    /// The accept loop unwound because it was cancelled (the normal stop path).
    Cancelled,
}

/// Handle to a running HTTP server
///
/// Reports the bound address and stops the listener coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to. A requested port `0` is already resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the listener coroutine has already exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_done()
    }

    /// Stop the server
    ///
    /// Cancels the listener coroutine and waits for it to finish. Consumes the
    /// handle. A coroutine that already exited counts as stopped.
    pub fn stop(self) -> JoinOutcome {
        if !self.is_finished() {
            // SAFETY: may::CoroutineHandle::coroutine().cancel() is marked unsafe by the may runtime.
            // This is sound because:
            // - The coroutine handle is valid (we're holding it)
            // - The accept loop holds no state that must survive an unwind
            // - Cancellation is the intended behavior during shutdown
            unsafe {
                self.handle.coroutine().cancel();
            }
        }
        match self.handle.join() {
            Ok(()) => JoinOutcome::Finished,
            Err(_) => {
                debug!(addr = %self.addr, "listener coroutine unwound on cancel");
                JoinOutcome::Cancelled
            }
        }
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start the HTTP server on the given address
    ///
    /// The socket is bound before this returns, so bind failures (port in use,
    /// unresolvable address) surface here rather than on the listener coroutine.
    /// Port `0` is resolved to a free ephemeral port first, so the handle always
    /// reports a connectable address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind to (e.g., `"0.0.0.0:8080"` or `"127.0.0.1:3000"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let addr = resolve_ephemeral(addr)?;
        let handle = HttpServerWithHeaders::<_, 32>(self.0).start(addr)?;
        Ok(ServerHandle { addr, handle })
    }
}

/// Poll `addr` with TCP connects until one succeeds or `timeout` elapses.
///
/// An unspecified bind address (`0.0.0.0` / `::`) is probed over loopback.
///
/// # Errors
///
/// `InvalidInput` for port `0`, which nothing can connect to, and `TimedOut` when
/// no connection is accepted in time.
pub fn wait_ready(addr: SocketAddr, timeout: Duration) -> io::Result<()> {
    if addr.port() == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "cannot probe port 0"));
    }
    let probe = probe_addr(addr);
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect_timeout(&probe, Duration::from_millis(50)).is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"));
        }
        thread::sleep(Duration::from_millis(5));
    }
}

// may_minihttp binds internally and does not expose the listener, so an
// ephemeral port is picked here and handed over as a concrete one. Another
// process can take it in between; that surfaces as an ordinary bind error.
fn resolve_ephemeral(addr: SocketAddr) -> io::Result<SocketAddr> {
    if addr.port() != 0 {
        return Ok(addr);
    }
    TcpListener::bind(addr)?.local_addr()
}

fn probe_addr(addr: SocketAddr) -> SocketAddr {
    match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port())
        }
        _ => addr,
    }
}
