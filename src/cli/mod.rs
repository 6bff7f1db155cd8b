//! # CLI Module
//!
//! Command-line front end for the serve controller.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve a document until interrupted (SIGINT/SIGTERM):
//!
//! ```bash
//! webserve serve --file page.html --port 9000 --watch
//! webserve serve --text '<h1>hello</h1>'
//! ```
//!
//! Options:
//! - `--file <FILE>` - Serve the content of a file
//! - `--text <TEXT>` - Serve a literal document
//! - `--port <PORT>` / `--address <ADDR>` - Bind parameters (default `0.0.0.0:8080`)
//! - `--watch` - Re-serve `--file` whenever it changes
//! - `--config <FILE>` - TOML configuration (see [`crate::config`])
//!
//! ### `repl`
//!
//! Drive the controller interactively, one `serve` call per line:
//!
//! ```text
//! > serve "<h1>v1</h1>" 9000 "127.0.0.1"
//! serving on 127.0.0.1:9000
//! > serve "<h1>v2</h1>"
//! serving on 127.0.0.1:9000
//! > serve 0
//! stopped 127.0.0.1:9000
//! > quit
//! ```

mod commands;
mod repl;


pub use commands::{run_cli, Cli, Commands};
pub use repl::{parse_args, run_repl, tokenize};
