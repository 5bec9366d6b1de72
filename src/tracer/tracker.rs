//! Instrumentation sessions
//!
//! A [`Tracker`] owns the hook registry, the reserved operation set and the log sink
//! shared by every target it instruments. Instrumenting is two-phase: the whole plan
//! (selection and origin lookup) is computed first, and only if it succeeds are hooks
//! registered, exclusions recorded and the decorator built.

use super::hooks::{AfterHook, BeforeHook, Hook, HookRegistry};
use super::reserved::ReservedOperationSet;
use super::selector::{OperationDescriptor, OperationKind, OperationSelector};
use super::source_locator::SourceLocator;
use super::tracked::{merge_descriptors, unwrap_tracked, Interceptor, Tracked};
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::logging::{LogSink, TracingSink};
use crate::target::{TargetKind, Trackable};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

static GLOBAL: OnceLock<Tracker> = OnceLock::new();

/// What to instrument and which hooks to add
#[derive(Clone, Default)]
pub struct InstrumentOptions {
    /// Operations to wrap; empty means every declared operation
    pub operations: Vec<String>,
    /// Operations never to wrap, added to the tracker's reserved set
    pub except: Vec<String>,
    pub before: Option<BeforeHook>,
    pub after: Option<AfterHook>,
}

impl InstrumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.operations.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn except<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn before(mut self, hook: BeforeHook) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: AfterHook) -> Self {
        self.after = Some(hook);
        self
    }
}

/// An instrumentation session
pub struct Tracker {
    config: TrackerConfig,
    hooks: Arc<HookRegistry>,
    reserved: Arc<ReservedOperationSet>,
    locator: SourceLocator,
    interceptor: Arc<Interceptor>,
}

impl Tracker {
    /// Create a tracker that logs through `tracing`
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create a tracker writing trace lines to `sink`
    pub fn with_sink(config: TrackerConfig, sink: Arc<dyn LogSink>) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let reserved = Arc::new(ReservedOperationSet::default());
        reserved.extend(config.reserved.iter().cloned());

        let interceptor = Arc::new(Interceptor::new(
            Arc::clone(&hooks),
            Arc::clone(&reserved),
            sink,
            config.severity,
            config.failure_policy,
        ));

        Self {
            locator: SourceLocator::new(config.origin_segments),
            config,
            hooks,
            reserved,
            interceptor,
        }
    }

    /// Process-wide session used by the free functions
    ///
    /// Configured from the environment on first use; invalid settings fall back to defaults.
    pub fn global() -> &'static Tracker {
        GLOBAL.get_or_init(|| {
            let config = TrackerConfig::from_env().unwrap_or_else(|e| {
                warn!("Ignoring tracker environment: {}", e);
                TrackerConfig::default()
            });
            Tracker::new(config)
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn reserved(&self) -> &ReservedOperationSet {
        &self.reserved
    }

    /// Add a hook that applies to every operation this tracker wraps
    pub fn register(&self, hook: Hook) {
        self.hooks.register(hook);
    }

    /// Wrap the selected operations of `target`
    ///
    /// Returns the decorator; callers substitute it for the original. Instrumenting a
    /// value that is already a [`Tracked`] replaces its layer with one covering both the
    /// previous and the newly selected operations, minus any that are now reserved.
    pub fn instrument(
        &self,
        target: Arc<dyn Trackable>,
        options: InstrumentOptions,
    ) -> Result<Arc<Tracked>> {
        let (original, previous) = unwrap_tracked(&target);
        let planned = self.plan(original.as_ref(), &options.operations, &options.except)?;

        self.reserved.extend(options.except.iter().cloned());
        if let Some(hook) = options.before {
            self.hooks.register_before(hook);
        }
        if let Some(hook) = options.after {
            self.hooks.register_after(hook);
        }

        let mut descriptors = merge_descriptors(previous, planned);
        self.interceptor.retain_unreserved(&mut descriptors);
        debug!(
            "Instrumenting {} ({} operation(s))",
            original.type_name(),
            descriptors.len()
        );

        Ok(Arc::new(Tracked::new(original, descriptors, Arc::clone(&self.interceptor))))
    }

    /// Resolve the descriptors `instrument` would install, without installing anything
    pub fn plan(
        &self,
        target: &dyn Trackable,
        names: &[String],
        except: &[String],
    ) -> Result<Vec<OperationDescriptor>> {
        let selection = OperationSelector::new(&self.reserved).select(target, names, except)?;
        let type_name = target.type_name();
        let own_kind = match target.kind() {
            TargetKind::TypeLevel => OperationKind::Static,
            TargetKind::InstanceLevel => OperationKind::Instance,
        };

        let mut descriptors = Vec::new();
        for name in &selection.static_ops {
            let origin = self.locator.locate(target, name);
            descriptors.push(OperationDescriptor::new(type_name, name, OperationKind::Static, origin));
        }
        for name in &selection.instance_ops {
            let origin = match (own_kind, selection.placeholder()) {
                (OperationKind::Static, Some(instance)) => self.locator.locate(&**instance, name),
                _ => self.locator.locate(target, name),
            };
            descriptors.push(OperationDescriptor::new(type_name, name, OperationKind::Instance, origin));
        }

        Ok(descriptors)
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

/// Instrument `target` with the process-wide tracker
pub fn instrument(target: Arc<dyn Trackable>, options: InstrumentOptions) -> Result<Arc<Tracked>> {
    Tracker::global().instrument(target, options)
}

/// Check whether `operation` is wrapped on `target`
pub fn is_tracked(target: &dyn Trackable, operation: &str) -> bool {
    target
        .as_tracked()
        .map_or(false, |tracked| tracked.is_tracking(operation))
}
