//! # Document Watching
//!
//! Re-serve a document file whenever it changes on disk.
//!
//! Each modify/create event re-reads the file and hands its content to
//! [`ServerController::start`], which swaps the document in place while the
//! listener runs (the address and port are only used if nothing is running).
//!
//! A file that cannot be read, or is not valid UTF-8, is logged and skipped; the
//! previously served document stays in place. Editors that save in several steps
//! simply produce several swaps, the last one winning.

use crate::controller::ServerController;
use crate::lock::HostLock;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Watch `path` and serve its content through `controller` on every change.
///
/// The returned watcher must be kept alive for as long as updates are wanted.
pub fn watch_document<P, L>(
    path: P,
    controller: Arc<ServerController<L>>,
    address: String,
    port: u16,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    L: HostLock + 'static,
{
    let path: PathBuf = path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    reload(&watch_path, &controller, &address, port);
                }
            }
            Err(e) => warn!(error = ?e, "watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn reload<L: HostLock>(path: &Path, controller: &ServerController<L>, address: &str, port: u16) {
    match std::fs::read_to_string(path) {
        Ok(content) => match controller.start(&content, address, port) {
            Ok(_) => info!(path = %path.display(), bytes = content.len(), "document reloaded"),
            Err(e) => warn!(path = %path.display(), error = %e, "reload failed"),
        },
        Err(e) => warn!(path = %path.display(), error = %e, "cannot read document"),
    }
}
