//! Host pinning hooks.
//!
//! While a listener is running, the code serving it must not be unloaded by the
//! host. The controller calls [`HostLock::lock`] once when a listener becomes
//! active and [`HostLock::unlock`] once after it has fully stopped.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Pin/unpin hook provided by the hosting environment.
pub trait HostLock: Send + Sync {
    fn lock(&self);
    fn unlock(&self);
}

/// Hook for hosts with nothing to pin.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLock;

impl HostLock for NoopLock {
    fn lock(&self) {}
    fn unlock(&self) {}
}

/// Counts outstanding pins.
#[derive(Debug, Default)]
pub struct PinCount {
    pins: AtomicUsize,
}

impl PinCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinned(&self) -> bool {
        self.pins.load(Ordering::Acquire) > 0
    }

    pub fn pins(&self) -> usize {
        self.pins.load(Ordering::Acquire)
    }
}

impl HostLock for PinCount {
    fn lock(&self) {
        self.pins.fetch_add(1, Ordering::AcqRel);
    }

    fn unlock(&self) {
        // saturating: an unbalanced unlock must not wrap
        let _ = self
            .pins
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

impl<T: HostLock + ?Sized> HostLock for std::sync::Arc<T> {
    fn lock(&self) {
        (**self).lock()
    }

    fn unlock(&self) {
        (**self).unlock()
    }
}
