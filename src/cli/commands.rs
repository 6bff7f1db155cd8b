use super::repl::run_repl;
use crate::config::ServeConfig;
use crate::controller::ServerController;
use crate::lock::PinCount;
use crate::watch::watch_document;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for webserve
#[derive(Parser)]
#[command(name = "webserve")]
#[command(about = "Serve a single in-memory document over HTTP", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "WEBSERVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve a document until interrupted
    Serve {
        /// Serve the content of this file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Serve this literal document
        #[arg(short, long)]
        text: Option<String>,

        /// Port to listen on (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides configuration)
        #[arg(short, long)]
        address: Option<String>,

        /// Re-serve --file whenever it changes
        #[arg(short, long, default_value_t = false, requires = "file")]
        watch: bool,
    },
    /// Read serve commands from stdin
    Repl,
}

/// Run the parsed command line.
///
/// # Errors
///
/// Configuration, file and bind errors, with context.
pub fn run_cli(cli: Cli) -> Result<()> {
    let config = ServeConfig::load(cli.config.as_deref())?;
    config.apply_runtime();

    match cli.command {
        Commands::Serve {
            file,
            text,
            port,
            address,
            watch,
        } => {
            let document = match (&file, text) {
                (Some(path), _) => std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?,
                (None, Some(text)) => text,
                (None, None) => config.document.clone(),
            };
            let address = address.unwrap_or_else(|| config.address.clone());
            let port = port.unwrap_or(config.port);
            serve_until_signal(&config, document, address, port, file.filter(|_| watch))
        }
        Commands::Repl => {
            let pins = Arc::new(PinCount::new());
            let controller = ServerController::with_lock(Arc::clone(&pins));
            let stdin = io::stdin();
            run_repl(&controller, stdin.lock(), io::stdout())?;
            if pins.is_pinned() {
                bail!("listener still pinned after repl exit");
            }
            Ok(())
        }
    }
}

fn serve_until_signal(
    config: &ServeConfig,
    document: String,
    address: String,
    port: u16,
    watch: Option<PathBuf>,
) -> Result<()> {
    let controller = Arc::new(ServerController::with_lock(PinCount::new()));
    controller.start(&document, &address, port)?;
    controller
        .wait_ready(config.ready_timeout())
        .context("listener did not become ready")?;

    let _watcher = match watch {
        Some(path) => Some(
            watch_document(&path, Arc::clone(&controller), address, port)
                .with_context(|| format!("cannot watch {}", path.display()))?,
        ),
        None => None,
    };

    wait_for_shutdown()?;
    info!("shutdown requested");
    controller.stop();
    Ok(())
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("cannot install signal handlers")?;
    if let Some(sig) = signals.forever().next() {
        info!(signal = sig, "received signal");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}
