//! # Document Module
//!
//! Storage for the single payload served on `/`.
//!
//! The document is written by the controlling thread (each `start` call) and read
//! by request-handling coroutines inside `may_minihttp`. Reads must never observe a
//! partially written value, so the payload lives behind an [`ArcSwap`]: a write
//! publishes a complete new `Arc<String>` and readers either get the old one or the
//! new one.
//!
//! ## Ordering
//!
//! A value stored by [`Document::store`] is visible to every load that starts after
//! `store` returns. Requests already in flight may still hold the previous `Arc`.

use arc_swap::ArcSwap;
use std::sync::Arc;

/// Content served when the caller does not supply a document.
pub const DEFAULT_DOCUMENT: &str = "This is an Octave WebServer instance!";

/// Last-writer-wins holder for the served payload.
#[derive(Debug)]
pub struct Document {
    current: ArcSwap<String>,
}

impl Document {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial.into()),
        }
    }

    /// Replace the served payload.
    pub fn store(&self, document: impl Into<String>) {
        self.current.store(Arc::new(document.into()));
    }

    /// Snapshot of the current payload.
    ///
    /// The returned `Arc` stays valid even if the document is replaced while the
    /// caller is still writing it to a socket.
    pub fn load(&self) -> Arc<String> {
        self.current.load_full()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT)
    }
}
