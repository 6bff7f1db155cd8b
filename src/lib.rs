//! # webserve
//!
//! **webserve** serves a single in-memory document over HTTP from a listener that an
//! interactive host can start, update and stop as often as it likes.
//!
//! ## Overview
//!
//! The HTTP work is done by `may_minihttp` on the `may` coroutine runtime. This crate
//! owns what sits around it: the lifecycle of the one listener. A host calls
//! `serve(document, port, address)` to start serving or to swap the document in
//! place, and `serve(0)` to stop. After a stop the server instance is fresh, so the
//! next start can bind a different address or port.
//!
//! ## Architecture
//!
//! - **[`controller`]** - [`ServerController`], the `Idle`/`Running` state machine
//! - **[`server`]** - server instance, route table, `may_minihttp` service and handle
//! - **[`document`]** - lock-free storage of the served payload
//! - **[`host`]** - the `serve(args...)` boundary with argument validation
//! - **[`lock`]** - host pin/unpin hooks held while a listener runs
//! - **[`watch`]** - re-serve a file whenever it changes
//! - **[`config`]** / **[`logging`]** - TOML + environment configuration, tracing setup
//! - **[`cli`]** - the `webserve` binary (`serve` and `repl` commands)
//!
//! ### Lifecycle
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Controller as ServerController
//!     participant Instance as ServerInstance
//!     participant Listener as may_minihttp listener
//!
//!     Host->>Controller: start(doc, addr, port)
//!     Controller->>Controller: document.store(doc)
//!     Controller->>Instance: route("/") (if unrouted)
//!     Controller->>Instance: start()
//!     Instance->>Listener: bind + spawn accept loop
//!     Controller->>Host: lock()
//!     Host->>Controller: start(doc2, ...)
//!     Controller->>Controller: document.store(doc2)
//!     Host->>Controller: stop()
//!     Controller->>Listener: cancel + join
//!     Controller->>Instance: reset()
//!     Controller->>Host: unlock()
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use webserve::ServerController;
//!
//! let controller = ServerController::new();
//! controller.start("<h1>v1</h1>", "127.0.0.1", 9000)?;
//! controller.wait_ready(Duration::from_millis(250))?;
//! controller.start("<h1>v2</h1>", "127.0.0.1", 9000)?; // swaps the document only
//! controller.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod host;
pub mod lock;
pub mod logging;
pub mod server;
pub mod watch;

pub use controller::{ControllerState, ServerController, StopOutcome};
pub use document::{Document, DEFAULT_DOCUMENT};
pub use error::ServeError;
pub use host::{serve, HostValue, ServeOutcome, ServeRequest};
pub use lock::{HostLock, NoopLock, PinCount};
