//! Hook storage and fault-isolated dispatch
//!
//! Hooks are caller-supplied callbacks run around every wrapped call. They are appended
//! per phase, dispatched in registration order, and never removed. A hook that returns an
//! error or panics is skipped silently: the remaining hooks and the traced call carry on.

use crate::target::Trackable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Callback run before the original operation: `(context, display_name, args)`
pub type BeforeHook = Arc<dyn Fn(&dyn Trackable, &str, &[Value]) -> anyhow::Result<()> + Send + Sync>;

/// Callback run after the original operation: `(context, display_name, args, duration)`
pub type AfterHook =
    Arc<dyn Fn(&dyn Trackable, &str, &[Value], Duration) -> anyhow::Result<()> + Send + Sync>;

/// Build a [`BeforeHook`] from a closure
pub fn before_hook<F>(f: F) -> BeforeHook
where
    F: Fn(&dyn Trackable, &str, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build an [`AfterHook`] from a closure
pub fn after_hook<F>(f: F) -> AfterHook
where
    F: Fn(&dyn Trackable, &str, &[Value], Duration) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Phase a hook runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
    Before,
    After,
}

/// A hook tagged with its phase
#[derive(Clone)]
pub enum Hook {
    Before(BeforeHook),
    After(AfterHook),
}

impl Hook {
    pub fn phase(&self) -> HookPhase {
        match self {
            Hook::Before(_) => HookPhase::Before,
            Hook::After(_) => HookPhase::After,
        }
    }
}

/// Ordered, append-only hook lists keyed by phase
#[derive(Default)]
pub struct HookRegistry {
    before: RwLock<Vec<BeforeHook>>,
    after: RwLock<Vec<AfterHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook to its phase
    pub fn register(&self, hook: Hook) {
        match hook {
            Hook::Before(hook) => self.register_before(hook),
            Hook::After(hook) => self.register_after(hook),
        }
    }

    pub fn register_before(&self, hook: BeforeHook) {
        self.before.write().unwrap_or_else(PoisonError::into_inner).push(hook);
    }

    pub fn register_after(&self, hook: AfterHook) {
        self.after.write().unwrap_or_else(PoisonError::into_inner).push(hook);
    }

    /// Number of hooks registered for a phase
    pub fn count(&self, phase: HookPhase) -> usize {
        match phase {
            HookPhase::Before => self.before.read().unwrap_or_else(PoisonError::into_inner).len(),
            HookPhase::After => self.after.read().unwrap_or_else(PoisonError::into_inner).len(),
        }
    }

    /// Run every `before` hook in registration order
    pub fn dispatch_before(&self, context: &dyn Trackable, display_name: &str, args: &[Value]) {
        // Snapshot so hooks run outside the lock and may register further hooks
        let hooks = self.before.read().unwrap_or_else(PoisonError::into_inner).clone();
        for hook in &hooks {
            isolate(|| hook(context, display_name, args));
        }
    }

    /// Run every `after` hook in registration order
    pub fn dispatch_after(
        &self,
        context: &dyn Trackable,
        display_name: &str,
        args: &[Value],
        duration: Duration,
    ) {
        let hooks = self.after.read().unwrap_or_else(PoisonError::into_inner).clone();
        for hook in &hooks {
            isolate(|| hook(context, display_name, args, duration));
        }
    }
}

/// Run a hook, discarding its error or panic
fn isolate<F>(hook: F)
where
    F: FnOnce() -> anyhow::Result<()>,
{
    let _ = panic::catch_unwind(AssertUnwindSafe(hook));
}
