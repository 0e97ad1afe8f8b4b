//! Event registration: the observer trait and the observer slot.
//!
//! A runtime holds exactly one [`ObserverSlot`]. Installing replaces whatever
//! was there; removing empties it. The runtime consults the slot on every
//! event, so nothing is delivered after removal.

use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::event::ExecutionEvent;
use crate::frame::Frame;

/// Receives execution events from a runtime.
pub trait Observer: Send + Sync {
    /// Handles one event.
    ///
    /// The returned observer receives the remaining events of the frame's
    /// activation (`None` stops them). Returning `Some(self)` keeps the same
    /// observer attached.
    fn observe(
        self: Arc<Self>,
        frame: &dyn Frame,
        event: &ExecutionEvent<'_>,
    ) -> Option<Arc<dyn Observer>>;
}

static GLOBAL: LazyLock<Arc<ObserverSlot>> = LazyLock::new(|| Arc::new(ObserverSlot::new()));

/// Holder for the single active observer.
#[derive(Default)]
pub struct ObserverSlot {
    current: RwLock<Option<Arc<dyn Observer>>>,
}

impl ObserverSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Returns the process-wide slot.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&*GLOBAL)
    }

    /// Installs `observer`, returning the one it replaced.
    pub fn install(&self, observer: Arc<dyn Observer>) -> Option<Arc<dyn Observer>> {
        let previous = self.current.write().replace(observer);
        tracing::debug!(replaced = previous.is_some(), "observer installed");
        previous
    }

    /// Empties the slot, returning the removed observer. A no-op when empty.
    pub fn remove(&self) -> Option<Arc<dyn Observer>> {
        let previous = self.current.write().take();
        if previous.is_some() {
            tracing::debug!("observer removed");
        }
        previous
    }

    /// Returns the installed observer, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn Observer>> {
        self.current.read().clone()
    }

    /// Returns true if an observer is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.current.read().is_some()
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}
