//! Cooperative stop coordination
//!
//! `stop()` is the one supported mid-run exit that is not an error: it sets a
//! flag that the orchestrator checks between yielded outcomes, persists a
//! `paused` checkpoint, and returns normally. It never interrupts in-flight
//! dispatcher work; cancellation takes effect at the next outcome boundary.

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared handle to a stop controller.
pub type SharedStop = Arc<StopController>;

static GLOBAL_STOP: OnceCell<SharedStop> = OnceCell::new();

/// Register a global stop handle so subsystems can discover it lazily.
pub fn set_global_stop(handle: SharedStop) {
    let _ = GLOBAL_STOP.set(handle);
}

/// Retrieve the registered global stop handle, if available.
pub fn get_global_stop() -> Option<SharedStop> {
    GLOBAL_STOP.get().cloned()
}

/// Coordinates cooperative pause across async tasks.
#[derive(Debug, Default)]
pub struct StopController {
    requested: AtomicBool,
    notify: Notify,
}

impl StopController {
    /// Create a new controller.
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Create a new shared controller wrapped in [`Arc`].
    pub fn shared() -> SharedStop {
        Arc::new(Self::new())
    }

    /// Request a stop. Notifies all waiters exactly once.
    pub fn request_stop(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait until a stop is requested. Returns immediately if already set.
    pub async fn wait_for_stop(&self) {
        if self.is_stop_requested() {
            return;
        }
        self.notify.notified().await;
    }
}
