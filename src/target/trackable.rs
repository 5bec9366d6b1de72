use crate::error::{Result, TrackerError};
use crate::tracer::Tracked;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Which namespace a target represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The type itself; its own operations are static, its instances carry instance operations
    TypeLevel,
    /// A single object; its operations are instance operations
    InstanceLevel,
}

/// An operation a target declares, with the site it was declared at
///
/// Use the [`operation!`](crate::operation) macro to record the declaration site
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDecl {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_at: Option<String>,
}

impl OperationDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_at: None,
        }
    }

    pub fn declared_at(mut self, location: impl Into<String>) -> Self {
        self.declared_at = Some(location.into());
        self
    }
}

/// Declare an operation, recording the current `file:line` as its origin.
#[macro_export]
macro_rules! operation {
    ($name:expr) => {
        $crate::OperationDecl::new($name).declared_at(concat!(file!(), ":", line!()))
    };
}

/// Dynamic dispatch surface for anything the tracker can instrument
///
/// Operations are addressed by name and take their arguments as JSON values, so a
/// decorator can implement this same trait around any other implementor.
pub trait Trackable: Send + Sync {
    /// Type name used in display names (`Robot.create`, `Robot#greet`)
    fn type_name(&self) -> &str;

    /// Whether this value stands for a type or for one of its instances
    fn kind(&self) -> TargetKind;

    /// The operations this target declares
    fn operations(&self) -> Vec<OperationDecl>;

    /// Invoke an operation by name
    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value>;

    /// Construct an instance of a type-level target
    ///
    /// Called with no arguments to obtain a placeholder instance when probing
    /// instance operations, so types that want their instance operations enumerated
    /// must accept an empty argument list.
    fn instantiate(&self, _args: &[Value]) -> Result<Arc<dyn Trackable>> {
        Err(TrackerError::NotInstantiable(self.type_name().to_string()))
    }

    /// Check if this target declares the given operation
    fn responds_to(&self, name: &str) -> bool {
        self.operations().iter().any(|op| op.name == name)
    }

    /// Identity tag for installed decorators
    ///
    /// Only [`Tracked`] overrides this. Plain targets keep the default.
    fn as_tracked(&self) -> Option<&Tracked> {
        None
    }
}
