//! Keep-awake lock
//!
//! The platform part (wake lock, screen saver inhibition…) sits behind the
//! [`KeepAwake`] trait; [`KeepAwakeGuard`] makes sure acquire and release
//! alternate and that a held lock is released when the guard is dropped.

use std::sync::Arc;
use tracing::{debug, info};

/// Platform keep-awake backend
pub trait KeepAwake: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}

/// Backend that only logs (hosts without a wake lock API)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogKeepAwake;

impl KeepAwake for LogKeepAwake {
    fn acquire(&self) {
        info!("Keep-awake acquired");
    }

    fn release(&self) {
        info!("Keep-awake released");
    }
}

/// Scoped holder of the keep-awake lock
pub struct KeepAwakeGuard {
    backend: Arc<dyn KeepAwake>,
    held: bool,
}

impl KeepAwakeGuard {
    pub fn new(backend: Arc<dyn KeepAwake>) -> Self {
        Self {
            backend,
            held: false,
        }
    }

    /// Acquire or release; repeated calls with the same value do nothing
    pub fn set(&mut self, wanted: bool) {
        if wanted == self.held {
            return;
        }
        debug!(wanted, "Keep-awake guard update");
        if wanted {
            self.backend.acquire();
        } else {
            self.backend.release();
        }
        self.held = wanted;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl Drop for KeepAwakeGuard {
    fn drop(&mut self) {
        self.set(false);
    }
}

impl std::fmt::Debug for KeepAwakeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAwakeGuard")
            .field("held", &self.held)
            .finish()
    }
}
