pub mod http_server;
pub mod instance;
pub mod response;
pub mod service;

pub use http_server::{wait_ready, HttpServer, JoinOutcome, ServerHandle};
pub use instance::{ServerInstance, DEFAULT_ADDRESS, DEFAULT_PORT};
pub use service::{RouteError, RouteHandler, RouteService, RouteTable, ROOT_PATH};
