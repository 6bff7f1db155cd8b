//! The embedded server object the controller drives.
//!
//! A `ServerInstance` collects bind configuration and route bindings, then starts
//! a listener from them. Routes bound to an instance stay bound until the
//! instance is [`reset`](ServerInstance::reset); the controller resets (or
//! replaces) the instance on every stop so a later start begins unrouted.

use super::http_server::{HttpServer, ServerHandle};
use super::service::{RouteError, RouteHandler, RouteService, RouteTable, ROOT_PATH};
use std::io;
use tracing::{info, warn, Level};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration plus route bindings.
#[derive(Debug)]
pub struct ServerInstance {
    address: String,
    port: u16,
    log_level: Level,
    routes: RouteTable,
}

impl ServerInstance {
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            log_level: Level::INFO,
            routes: RouteTable::new(),
        }
    }

    pub fn bind_address(&mut self, address: &str) -> &mut Self {
        self.address = address.to_string();
        self
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    /// Most verbose level the instance logs its own lifecycle events at.
    pub fn log_level(&mut self, level: Level) -> &mut Self {
        self.log_level = level;
        self
    }

    /// Bind `handler` to `path`.
    ///
    /// # Errors
    ///
    /// [`RouteError::AlreadyBound`] if this instance already serves `path`.
    pub fn route(&mut self, path: &str, handler: RouteHandler) -> Result<(), RouteError> {
        self.routes.bind(path, handler)
    }

    /// Whether the root route is bound on this instance.
    pub fn is_routed(&self) -> bool {
        self.routes.contains(ROOT_PATH)
    }

    /// `address:port` as handed to the socket layer. IPv6 literals get brackets.
    pub fn endpoint(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }

    /// Bind the configured endpoint and run the accept loop on a background coroutine.
    ///
    /// The route table is snapshotted: routes bound after this call do not reach
    /// the running listener.
    ///
    /// # Errors
    ///
    /// Propagates resolution and bind errors from the socket layer.
    pub fn start(&self) -> io::Result<ServerHandle> {
        let endpoint = self.endpoint();
        if self.routes.is_empty() && Level::WARN <= self.log_level {
            warn!(%endpoint, "starting a listener with no routes; every request gets 404");
        }
        let handle = HttpServer(RouteService::new(self.routes.clone()))
            .start(endpoint.as_str())?;
        if Level::INFO <= self.log_level {
            info!(addr = %handle.local_addr(), routes = self.routes.len(), "listener started");
        }
        Ok(handle)
    }

    /// Discard every route binding and return to the freshly constructed configuration.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ServerInstance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn handler() -> RouteHandler {
        let body = Arc::new("doc".to_string());
        Arc::new(move || Arc::clone(&body))
    }

    #[test]
    fn test_fresh_instance_is_unrouted() {
        let instance = ServerInstance::new();
        assert!(!instance.is_routed());
        assert_eq!(instance.endpoint(), "0.0.0.0:8080");
    }

    #[test]
    fn test_builder_setters() {
        let mut instance = ServerInstance::new();
        instance
            .bind_address("127.0.0.1")
            .port(9000)
            .log_level(Level::WARN);
        assert_eq!(instance.endpoint(), "127.0.0.1:9000");
    }

    #[test]
    fn test_ipv6_endpoint_is_bracketed() {
        let mut instance = ServerInstance::new();
        instance.bind_address("::1").port(81);
        assert_eq!(instance.endpoint(), "[::1]:81");
        instance.bind_address("[::1]");
        assert_eq!(instance.endpoint(), "[::1]:81");
    }

    #[test]
    fn test_root_route_binds_once() {
        let mut instance = ServerInstance::new();
        instance.route(ROOT_PATH, handler()).unwrap();
        assert!(instance.is_routed());
        assert!(instance.route(ROOT_PATH, handler()).is_err());
    }

    #[test]
    fn test_reset_discards_routes_and_config() {
        let mut instance = ServerInstance::new();
        instance.bind_address("127.0.0.1").port(1234);
        instance.route(ROOT_PATH, handler()).unwrap();

        instance.reset();

        assert!(!instance.is_routed());
        assert_eq!(instance.endpoint(), "0.0.0.0:8080");
        instance.route(ROOT_PATH, handler()).unwrap();
    }

    #[test]
    fn test_start_reports_unresolvable_address() {
        let mut instance = ServerInstance::new();
        instance.bind_address("not an address").port(0);
        assert!(instance.start().is_err());
    }
}
