//! Installing and removing a tracer.
//!
//! [`spew`] and [`unspew`] work on the process-wide slot; [`install_into`]
//! and [`remove_from`] take an explicit one. All of them are idempotent.
//! [`SpewGuard`] ties an installation to a scope.

use std::sync::Arc;

use spewer_foundation::{Observer, ObserverSlot};

use crate::config::TracerConfig;
use crate::hook::TraceHook;

/// Installs `hook` into `slot`, replacing any observer already there.
/// Returns the hook.
pub fn install_into(slot: &ObserverSlot, hook: Arc<TraceHook>) -> Arc<TraceHook> {
    let observer: Arc<dyn Observer> = hook.clone();
    slot.install(observer);
    hook
}

/// Empties `slot`. Returns true if something was removed.
pub fn remove_from(slot: &ObserverSlot) -> bool {
    slot.remove().is_some()
}

/// Installs a new tracer writing to standard error into the global slot.
pub fn spew(config: TracerConfig) -> Arc<TraceHook> {
    install_into(&ObserverSlot::global(), Arc::new(TraceHook::new(config)))
}

/// Removes whatever observer the global slot holds.
pub fn unspew() -> bool {
    remove_from(&ObserverSlot::global())
}

/// Keeps a tracer installed for as long as it lives.
///
/// Dropping the guard empties the slot, including when the scope is left by
/// `?` or by a panic.
#[must_use = "the tracer is removed as soon as the guard is dropped"]
pub struct SpewGuard {
    slot: Arc<ObserverSlot>,
    hook: Arc<TraceHook>,
}

impl SpewGuard {
    /// Installs `hook` into `slot`.
    pub fn new(slot: Arc<ObserverSlot>, hook: Arc<TraceHook>) -> Self {
        let hook = install_into(&slot, hook);
        Self { slot, hook }
    }

    /// Installs a new standard-error tracer into the global slot.
    pub fn global(config: TracerConfig) -> Self {
        Self::new(ObserverSlot::global(), Arc::new(TraceHook::new(config)))
    }

    /// The installed hook.
    #[must_use]
    pub fn hook(&self) -> &Arc<TraceHook> {
        &self.hook
    }

    /// The slot the hook lives in.
    #[must_use]
    pub fn slot(&self) -> &Arc<ObserverSlot> {
        &self.slot
    }
}

impl Drop for SpewGuard {
    fn drop(&mut self) {
        remove_from(&self.slot);
    }
}

impl std::fmt::Debug for SpewGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpewGuard")
            .field("hook", &self.hook)
            .finish_non_exhaustive()
    }
}

/// Runs `f` with `hook` installed in `slot`, then removes it. The closure's
/// result is returned untouched.
pub fn with_spew<R>(slot: Arc<ObserverSlot>, hook: Arc<TraceHook>, f: impl FnOnce() -> R) -> R {
    let _guard = SpewGuard::new(slot, hook);
    f()
}
