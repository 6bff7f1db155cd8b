//! # Controller Module
//!
//! [`ServerController`] owns the lifecycle of the single listener: it binds the root
//! route, launches the listener on a background coroutine, swaps the served document
//! while running, and tears everything down on stop so the next start begins from a
//! clean instance.
//!
//! ## State Machine
//!
//! ```text
//!            start (bind route, launch listener, pin host)
//!   Idle ───────────────────────────────────────────────► Running
//!    ▲ │                                                   │  ▲
//!    │ └─ stop (reset instance)         start (swap doc) ──┘  │
//!    │                                                        │
//!    └────────── stop (cancel + join, reset, unpin host) ─────┘
//! ```
//!
//! There is no terminal state. `start` and `stop` serialize on an internal mutex;
//! request handlers only read the [`Document`], which never blocks on that mutex.
//!
//! ## Bind Confirmation
//!
//! The listening socket is bound before `start` returns, so a port already in use
//! is reported to the caller and the controller stays `Idle`. `start` does not wait
//! for the accept loop to be scheduled; use [`ServerController::wait_ready`] when the
//! caller needs a connectable listener.
//!
//! ## In-flight Connections
//!
//! Stopping cancels the accept loop only. Connections that were already accepted
//! live on their own `may_minihttp` coroutines and finish independently; new
//! connections are refused as soon as `stop` returns.

use crate::document::{Document, DEFAULT_DOCUMENT};
use crate::error::ServeError;
use crate::lock::{HostLock, NoopLock};
use crate::server::{
    self, JoinOutcome, RouteHandler, ServerHandle, ServerInstance, DEFAULT_ADDRESS, DEFAULT_PORT,
    ROOT_PATH,
};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn, Level};

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running { addr: SocketAddr },
}

/// Result of [`ServerController::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A running listener was stopped and joined
    Stopped { addr: SocketAddr },
    /// Nothing was running
    AlreadyIdle,
}

struct Inner {
    instance: ServerInstance,
    listener: Option<ServerHandle>,
    pinned: bool,
}

/// Owner of the single served endpoint.
pub struct ServerController<L: HostLock = NoopLock> {
    document: Arc<Document>,
    inner: Mutex<Inner>,
    host: L,
}

impl ServerController<NoopLock> {
    pub fn new() -> Self {
        Self::with_lock(NoopLock)
    }
}

impl Default for ServerController<NoopLock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: HostLock> ServerController<L> {
    /// Controller that pins the host through `host` while a listener runs.
    pub fn with_lock(host: L) -> Self {
        Self {
            document: Arc::new(Document::new(DEFAULT_DOCUMENT)),
            inner: Mutex::new(Inner {
                instance: ServerInstance::new(),
                listener: None,
                pinned: false,
            }),
            host,
        }
    }

    /// Serve the default document on `0.0.0.0:8080`.
    pub fn start_default(&self) -> Result<ControllerState, ServeError> {
        self.start(DEFAULT_DOCUMENT, DEFAULT_ADDRESS, DEFAULT_PORT)
    }

    /// Serve `document`, launching a listener on `address:port` if none is running.
    ///
    /// With a listener already running only the document is replaced; `address`
    /// and `port` are ignored until the next [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// [`ServeError::Bind`] when the listener cannot be bound. The controller is
    /// then `Idle` with a fresh instance and the host is not pinned. The document is
    /// still updated.
    pub fn start(
        &self,
        document: &str,
        address: &str,
        port: u16,
    ) -> Result<ControllerState, ServeError> {
        let mut inner = self.lock_inner();

        self.document.store(document);

        if let Some(listener) = &inner.listener {
            let addr = listener.local_addr();
            if port != 0 && addr.port() != port {
                warn!(
                    running = %addr,
                    requested_port = port,
                    "listener already running; stop it first to rebind"
                );
            }
            debug!(bytes = document.len(), "document swapped");
            return Ok(ControllerState::Running { addr });
        }

        if !inner.instance.is_routed() {
            inner.instance.route(ROOT_PATH, self.root_handler())?;
        }
        inner
            .instance
            .bind_address(address)
            .port(port)
            .log_level(Level::WARN);

        let listener = match inner.instance.start() {
            Ok(listener) => listener,
            Err(source) => {
                let endpoint = inner.instance.endpoint();
                inner.instance.reset();
                warn!(%endpoint, error = %source, "listener failed to bind");
                return Err(ServeError::Bind { endpoint, source });
            }
        };

        let addr = listener.local_addr();
        inner.listener = Some(listener);
        if !inner.pinned {
            self.host.lock();
            inner.pinned = true;
        }
        info!(%addr, bytes = document.len(), "serving document");
        Ok(ControllerState::Running { addr })
    }

    /// Stop the listener, join it, and reset the server instance.
    ///
    /// Safe to call repeatedly; stopping an idle controller only resets the instance.
    pub fn stop(&self) -> StopOutcome {
        let mut inner = self.lock_inner();

        let outcome = match inner.listener.take() {
            Some(listener) => {
                let addr = listener.local_addr();
                match listener.stop() {
                    JoinOutcome::Finished => debug!(%addr, "listener had already exited"),
                    JoinOutcome::Cancelled => debug!(%addr, "listener cancelled"),
                }
                info!(%addr, "listener stopped");
                StopOutcome::Stopped { addr }
            }
            None => StopOutcome::AlreadyIdle,
        };

        inner.instance.reset();
        if inner.pinned {
            self.host.unlock();
            inner.pinned = false;
        }
        outcome
    }

    pub fn state(&self) -> ControllerState {
        match &self.lock_inner().listener {
            Some(listener) => ControllerState::Running {
                addr: listener.local_addr(),
            },
            None => ControllerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_inner().listener.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_inner().listener.as_ref().map(ServerHandle::local_addr)
    }

    /// Whether the root route is bound on the current instance.
    pub fn is_route_registered(&self) -> bool {
        self.lock_inner().instance.is_routed()
    }

    /// The document currently served.
    pub fn document(&self) -> Arc<String> {
        self.document.load()
    }

    /// Block until the running listener accepts connections.
    ///
    /// Polls without holding the controller lock, so `start` and `stop` from other
    /// threads proceed while a caller waits here.
    ///
    /// # Errors
    ///
    /// `NotConnected` when idle, `TimedOut` when the listener does not come up in time.
    pub fn wait_ready(&self, timeout: Duration) -> io::Result<()> {
        let addr = self.local_addr().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no listener is running")
        })?;
        server::wait_ready(addr, timeout)
    }

    fn root_handler(&self) -> RouteHandler {
        let document = Arc::clone(&self.document);
        Arc::new(move || document.load())
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        // Inner is consistent between statements that could panic, so a poisoned
        // lock is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<L: HostLock> Drop for ServerController<L> {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::PinCount;
    use std::net::TcpListener;

    fn occupied_port() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[test]
    fn test_new_controller_is_idle() {
        let controller = ServerController::new();
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(!controller.is_route_registered());
        assert_eq!(controller.document().as_str(), DEFAULT_DOCUMENT);
        assert!(controller.local_addr().is_none());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let controller = ServerController::new();
        assert_eq!(controller.stop(), StopOutcome::AlreadyIdle);
        assert_eq!(controller.stop(), StopOutcome::AlreadyIdle);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_wait_ready_when_idle() {
        let controller = ServerController::new();
        let err = controller.wait_ready(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_bind_failure_leaves_controller_idle_and_unpinned() {
        let pins = Arc::new(PinCount::new());
        let controller = ServerController::with_lock(Arc::clone(&pins));
        let (_guard, port) = occupied_port();

        let err = controller.start("doc", "127.0.0.1", port).unwrap_err();

        assert!(matches!(err, ServeError::Bind { .. }));
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(!controller.is_route_registered());
        assert!(!pins.is_pinned());
        assert_eq!(controller.document().as_str(), "doc");
    }

    #[test]
    fn test_port_zero_reports_bound_port() {
        may::config().set_stack_size(0x8000);
        let controller = ServerController::new();

        let state = controller.start("doc", "127.0.0.1", 0).unwrap();

        let addr = match state {
            ControllerState::Running { addr } => addr,
            ControllerState::Idle => panic!("expected a running listener"),
        };
        assert_ne!(addr.port(), 0);
        assert_eq!(controller.local_addr(), Some(addr));
        controller.wait_ready(Duration::from_secs(2)).unwrap();
        assert_eq!(controller.stop(), StopOutcome::Stopped { addr });
    }

    #[test]
    fn test_invalid_address_fails_at_bind() {
        let controller = ServerController::new();
        let err = controller.start("doc", "not an address", 0).unwrap_err();
        assert!(matches!(err, ServeError::Bind { .. }));
        assert!(!controller.is_running());
    }
}
