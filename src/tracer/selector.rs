//! Operation enumeration and classification
//!
//! The selector decides *which* operations of a target get wrapped and whether each one
//! is static (bound to the type) or instance (bound to objects of the type). It never
//! touches the target beyond reading its declarations, apart from constructing a
//! throwaway placeholder instance when a type-level target's instance operations have
//! to be probed.

use super::reserved::ReservedOperationSet;
use crate::error::{Result, TrackerError};
use crate::target::{TargetKind, Trackable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Namespace an operation is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Static,
    Instance,
}

impl OperationKind {
    /// Separator between type name and operation name in display names
    pub fn separator(&self) -> char {
        match self {
            OperationKind::Static => '.',
            OperationKind::Instance => '#',
        }
    }
}

/// `Robot.speak` for static operations, `Robot#greet` for instance operations
pub fn display_name(type_name: &str, name: &str, kind: OperationKind) -> String {
    format!("{}{}{}", type_name, kind.separator(), name)
}

/// A selected operation, ready to be wrapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub display_name: String,
    pub origin: String,
}

impl OperationDescriptor {
    pub fn new(
        type_name: &str,
        name: impl Into<String>,
        kind: OperationKind,
        origin: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: display_name(type_name, &name, kind),
            name,
            kind,
            origin: origin.into(),
        }
    }
}

/// Result of selecting operations on a target
pub struct Selection {
    pub static_ops: Vec<String>,
    pub instance_ops: Vec<String>,
    placeholder: Option<Arc<dyn Trackable>>,
}

impl Selection {
    /// The instance that was probed for instance operations, if any
    pub fn placeholder(&self) -> Option<&Arc<dyn Trackable>> {
        self.placeholder.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.static_ops.is_empty() && self.instance_ops.is_empty()
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("static_ops", &self.static_ops)
            .field("instance_ops", &self.instance_ops)
            .field("has_placeholder", &self.placeholder.is_some())
            .finish()
    }
}

/// Enumerates and classifies the operations of a target
pub struct OperationSelector<'a> {
    reserved: &'a ReservedOperationSet,
}

impl<'a> OperationSelector<'a> {
    pub fn new(reserved: &'a ReservedOperationSet) -> Self {
        Self { reserved }
    }

    /// Select operations on `target`
    ///
    /// With an empty `names` list every declared operation is selected. Operations in the
    /// reserved set or in `except` are never selected. A requested name the target does
    /// not declare fails with [`TrackerError::UnknownOperation`].
    pub fn select(
        &self,
        target: &dyn Trackable,
        names: &[String],
        except: &[String],
    ) -> Result<Selection> {
        let excluded = |name: &str| self.reserved.contains(name) || except.iter().any(|e| e == name);

        let own_kind = match target.kind() {
            TargetKind::TypeLevel => OperationKind::Static,
            TargetKind::InstanceLevel => OperationKind::Instance,
        };
        let own: Vec<String> = target.operations().into_iter().map(|op| op.name).collect();

        // Only names the target itself does not declare can resolve on an instance
        let needs_probe = names.is_empty() || names.iter().any(|name| !own.contains(name));
        let placeholder = if needs_probe { probe_instance(target) } else { None };
        let probed: Vec<String> = placeholder
            .as_ref()
            .map(|instance| instance.operations().into_iter().map(|op| op.name).collect())
            .unwrap_or_default();

        let mut selection = Selection {
            static_ops: Vec::new(),
            instance_ops: Vec::new(),
            placeholder: None,
        };

        if names.is_empty() {
            let own_selected = dedup(own.into_iter().filter(|name| !excluded(name.as_str())));
            let probed_selected = dedup(probed.into_iter().filter(|name| !excluded(name.as_str())));
            match own_kind {
                OperationKind::Static => {
                    selection.static_ops = own_selected;
                    selection.instance_ops = probed_selected;
                }
                OperationKind::Instance => selection.instance_ops = own_selected,
            }
        } else {
            let mut seen: HashSet<(OperationKind, &str)> = HashSet::new();
            for name in names {
                let kind = if own.iter().any(|op| op == name) {
                    own_kind
                } else if probed.iter().any(|op| op == name) {
                    OperationKind::Instance
                } else {
                    return Err(TrackerError::UnknownOperation(format!(
                        "{}: {}",
                        target.type_name(),
                        name
                    )));
                };

                if excluded(name.as_str()) {
                    trace!("Skipping reserved operation {}", name);
                    continue;
                }
                if !seen.insert((kind, name.as_str())) {
                    continue;
                }
                match kind {
                    OperationKind::Static => selection.static_ops.push(name.clone()),
                    OperationKind::Instance => selection.instance_ops.push(name.clone()),
                }
            }
        }

        if !selection.instance_ops.is_empty() && own_kind == OperationKind::Static {
            selection.placeholder = placeholder;
        }
        Ok(selection)
    }
}

/// Placeholder instance of a type-level target, built with no arguments
fn probe_instance(target: &dyn Trackable) -> Option<Arc<dyn Trackable>> {
    match target.kind() {
        TargetKind::TypeLevel => target.instantiate(&[]).ok(),
        TargetKind::InstanceLevel => None,
    }
}

fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(name.clone())).collect()
}
