//! The installed decorator
//!
//! [`Tracked`] implements [`Trackable`] around an original target. Calls to wrapped
//! operations go through the interception pipeline; every other call is delegated to the
//! original untouched. A type-level `Tracked` also wraps the instances it hands out, which
//! is how instance operations are intercepted.

use super::hooks::HookRegistry;
use super::recorder::{CallOutcome, TraceRecorder};
use super::reserved::ReservedOperationSet;
use super::selector::{OperationDescriptor, OperationKind};
use crate::config::FailurePolicy;
use crate::error::Result;
use crate::logging::{LogSink, Severity};
use crate::target::{OperationDecl, TargetKind, Trackable};
use chrono::Local;
use serde_json::Value;
use std::panic;
use std::sync::Arc;
use tracing::debug;

/// Per-call pipeline shared by every decorator of a tracker session
pub(crate) struct Interceptor {
    hooks: Arc<HookRegistry>,
    reserved: Arc<ReservedOperationSet>,
    sink: Arc<dyn LogSink>,
    severity: Severity,
    failure_policy: FailurePolicy,
    recorder: TraceRecorder,
}

impl Interceptor {
    pub(crate) fn new(
        hooks: Arc<HookRegistry>,
        reserved: Arc<ReservedOperationSet>,
        sink: Arc<dyn LogSink>,
        severity: Severity,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            hooks,
            reserved,
            sink,
            severity,
            failure_policy,
            recorder: TraceRecorder::new(),
        }
    }

    /// Drop descriptors whose operation has since become reserved
    pub(crate) fn retain_unreserved(&self, descriptors: &mut Vec<OperationDescriptor>) {
        descriptors.retain(|op| !self.reserved.contains(&op.name));
    }

    /// before hooks → original → log line → after hooks, then hand back the outcome
    fn intercept(
        &self,
        context: &dyn Trackable,
        operation: &OperationDescriptor,
        args: &[Value],
    ) -> Result<Value> {
        let display_name = operation.display_name.as_str();

        self.hooks.dispatch_before(context, display_name, args);

        let recording = self.recorder.record(display_name, args, &operation.origin, || {
            context.invoke(&operation.name, args)
        });

        self.sink.emit(self.severity, Local::now(), &recording.log_line());
        self.hooks.dispatch_after(context, display_name, args, recording.duration);

        match (recording.outcome, self.failure_policy) {
            (CallOutcome::Returned(Ok(value)), _) => Ok(value),
            (CallOutcome::Returned(Err(e)), FailurePolicy::Propagate) => Err(e),
            (CallOutcome::Panicked(payload), FailurePolicy::Propagate) => panic::resume_unwind(payload),
            (_, FailurePolicy::Swallow) => {
                debug!("Swallowed failure of {}", display_name);
                Ok(Value::Null)
            }
        }
    }
}

/// Decorator installed over an instrumented target
pub struct Tracked {
    original: Arc<dyn Trackable>,
    wrapped: Vec<OperationDescriptor>,
    instance_ops: Vec<OperationDescriptor>,
    interceptor: Arc<Interceptor>,
}

impl Tracked {
    pub(crate) fn new(
        original: Arc<dyn Trackable>,
        descriptors: Vec<OperationDescriptor>,
        interceptor: Arc<Interceptor>,
    ) -> Self {
        let (wrapped, instance_ops): (Vec<_>, Vec<_>) = match original.kind() {
            TargetKind::TypeLevel => descriptors
                .into_iter()
                .partition(|op| op.kind == OperationKind::Static),
            TargetKind::InstanceLevel => (descriptors, Vec::new()),
        };

        Self {
            original,
            wrapped,
            instance_ops,
            interceptor,
        }
    }

    /// The undecorated target
    pub fn original(&self) -> &Arc<dyn Trackable> {
        &self.original
    }

    /// All descriptors this decorator carries, including those applied to instances
    pub fn descriptors(&self) -> Vec<OperationDescriptor> {
        self.wrapped.iter().chain(self.instance_ops.iter()).cloned().collect()
    }

    /// Descriptor of an operation intercepted on this value
    pub fn descriptor(&self, name: &str) -> Option<&OperationDescriptor> {
        self.wrapped.iter().find(|op| op.name == name)
    }

    pub fn is_tracking(&self, name: &str) -> bool {
        self.wrapped.iter().chain(self.instance_ops.iter()).any(|op| op.name == name)
    }

    /// Wrap an existing instance with this type's instance operations
    ///
    /// An instance that is already tracked is unwrapped first, so it never ends up with
    /// more than one decorator. Operations reserved since it was wrapped are left unwrapped.
    pub fn track_instance(&self, instance: Arc<dyn Trackable>) -> Arc<Tracked> {
        let (original, previous) = unwrap_tracked(&instance);
        let mut descriptors = merge_descriptors(previous, self.instance_ops.clone());
        self.interceptor.retain_unreserved(&mut descriptors);
        Arc::new(Tracked {
            original,
            wrapped: descriptors,
            instance_ops: Vec::new(),
            interceptor: Arc::clone(&self.interceptor),
        })
    }
}

impl Trackable for Tracked {
    fn type_name(&self) -> &str {
        self.original.type_name()
    }

    fn kind(&self) -> TargetKind {
        self.original.kind()
    }

    fn operations(&self) -> Vec<OperationDecl> {
        self.original.operations()
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.descriptor(name) {
            Some(operation) => self.interceptor.intercept(self.original.as_ref(), operation, args),
            None => self.original.invoke(name, args),
        }
    }

    fn instantiate(&self, args: &[Value]) -> Result<Arc<dyn Trackable>> {
        let instance = self.original.instantiate(args)?;
        if self.instance_ops.is_empty() {
            return Ok(instance);
        }
        Ok(self.track_instance(instance))
    }

    fn as_tracked(&self) -> Option<&Tracked> {
        Some(self)
    }
}

/// Split a possibly-decorated target into its original and the descriptors it carried
pub(crate) fn unwrap_tracked(
    target: &Arc<dyn Trackable>,
) -> (Arc<dyn Trackable>, Vec<OperationDescriptor>) {
    match target.as_tracked() {
        Some(tracked) => (Arc::clone(&tracked.original), tracked.descriptors()),
        None => (Arc::clone(target), Vec::new()),
    }
}

/// Union keyed by (kind, name); later descriptors replace earlier ones
pub(crate) fn merge_descriptors(
    mut existing: Vec<OperationDescriptor>,
    added: Vec<OperationDescriptor>,
) -> Vec<OperationDescriptor> {
    for descriptor in added {
        match existing
            .iter_mut()
            .find(|op| op.kind == descriptor.kind && op.name == descriptor.name)
        {
            Some(slot) => *slot = descriptor,
            None => existing.push(descriptor),
        }
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullSink;
    use crate::test_support::{CaptureSink, Journal, RobotType};
    use serde_json::json;

    fn interceptor(sink: Arc<dyn LogSink>, policy: FailurePolicy) -> Arc<Interceptor> {
        interceptor_with(Arc::new(ReservedOperationSet::default()), sink, policy)
    }

    fn interceptor_with(
        reserved: Arc<ReservedOperationSet>,
        sink: Arc<dyn LogSink>,
        policy: FailurePolicy,
    ) -> Arc<Interceptor> {
        Arc::new(Interceptor::new(
            Arc::new(HookRegistry::new()),
            reserved,
            sink,
            Severity::Debug,
            policy,
        ))
    }

    fn descriptor(name: &str, kind: OperationKind) -> OperationDescriptor {
        OperationDescriptor::new("Robot", name, kind, "src/robot.rs:1")
    }

    #[test]
    fn test_wrapped_call_is_logged_and_delegated() {
        let journal = Journal::default();
        let sink = Arc::new(CaptureSink::new(journal.clone()));
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone())),
            vec![descriptor("speak", OperationKind::Static)],
            interceptor(sink.clone(), FailurePolicy::Propagate),
        );

        let result = tracked.invoke("speak", &[json!("hi")]).unwrap();

        assert_eq!(result, json!("Robot says hi"));
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].starts_with("called \"Robot.speak\" with [\"hi\"] [src/robot.rs:1] ("));
    }

    #[test]
    fn test_unwrapped_call_is_not_logged() {
        let journal = Journal::default();
        let sink = Arc::new(CaptureSink::new(journal.clone()));
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone())),
            vec![descriptor("speak", OperationKind::Static)],
            interceptor(sink.clone(), FailurePolicy::Propagate),
        );

        tracked.invoke("reset", &[]).unwrap();

        assert!(sink.lines().is_empty());
        assert_eq!(journal.entries(), vec!["original:Robot.reset"]);
    }

    #[test]
    fn test_type_level_partitions_descriptors() {
        let tracked = Tracked::new(
            Arc::new(RobotType::new(Journal::default())),
            vec![
                descriptor("speak", OperationKind::Static),
                descriptor("greet", OperationKind::Instance),
            ],
            interceptor(Arc::new(NullSink), FailurePolicy::Propagate),
        );

        assert!(tracked.descriptor("speak").is_some());
        assert!(tracked.descriptor("greet").is_none());
        assert!(tracked.is_tracking("greet"));
        assert_eq!(tracked.descriptors().len(), 2);
    }

    #[test]
    fn test_instantiate_wraps_instances() {
        let journal = Journal::default();
        let sink = Arc::new(CaptureSink::new(journal.clone()));
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone())),
            vec![descriptor("greet", OperationKind::Instance)],
            interceptor(sink.clone(), FailurePolicy::Propagate),
        );

        let instance = tracked.instantiate(&[json!("R2")]).unwrap();
        assert!(instance.as_tracked().is_some());

        let greeting = instance.invoke("greet", &[json!("Luke")]).unwrap();
        assert_eq!(greeting, json!("R2 greets Luke"));
        assert_eq!(sink.lines().len(), 1);
        assert!(sink.lines()[0].starts_with("called \"Robot#greet\" with [\"Luke\"]"));
    }

    #[test]
    fn test_track_instance_never_stacks() {
        let journal = Journal::default();
        let sink = Arc::new(CaptureSink::new(journal.clone()));
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone())),
            vec![descriptor("greet", OperationKind::Instance)],
            interceptor(sink.clone(), FailurePolicy::Propagate),
        );

        let once = tracked.track_instance(Arc::new(RobotType::new(journal.clone()).build("R2")));
        let twice = tracked.track_instance(once.clone());

        assert!(twice.original().as_tracked().is_none());
        twice.invoke("greet", &[json!("Leia")]).unwrap();
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_track_instance_drops_newly_reserved_operations() {
        let journal = Journal::default();
        let sink = Arc::new(CaptureSink::new(journal.clone()));
        let reserved = Arc::new(ReservedOperationSet::default());
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone())),
            vec![
                descriptor("greet", OperationKind::Instance),
                descriptor("beep", OperationKind::Instance),
            ],
            interceptor_with(Arc::clone(&reserved), sink.clone(), FailurePolicy::Propagate),
        );

        let once = tracked.track_instance(Arc::new(RobotType::new(journal.clone()).build("R2")));
        reserved.insert("beep");
        let twice = tracked.track_instance(once);

        assert!(!twice.is_tracking("beep"));
        twice.invoke("beep", &[]).unwrap();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_swallow_policy_returns_null() {
        let journal = Journal::default();
        let tracked = Tracked::new(
            Arc::new(RobotType::new(journal.clone()).build("R2")),
            vec![descriptor("fail", OperationKind::Instance)],
            interceptor(Arc::new(NullSink), FailurePolicy::Swallow),
        );

        assert_eq!(tracked.invoke("fail", &[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_merge_descriptors_replaces_same_operation() {
        let mut updated = descriptor("speak", OperationKind::Static);
        updated.origin = "src/robot.rs:99".to_string();

        let merged = merge_descriptors(
            vec![descriptor("speak", OperationKind::Static), descriptor("greet", OperationKind::Instance)],
            vec![updated.clone(), descriptor("create", OperationKind::Static)],
        );

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], updated);
        assert_eq!(merged[2].name, "create");
    }
}
