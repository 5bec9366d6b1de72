//! Operations that must never be wrapped

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

/// Identity, comparison and reflection primitives, plus the tracker's own entry points
pub const DEFAULT_RESERVED: &[&str] = &[
    "eq",
    "ne",
    "cmp",
    "partial_cmp",
    "hash",
    "clone",
    "fmt",
    "drop",
    "type_name",
    "type_id",
    "instrument",
    "is_tracked",
    "track_instance",
    "instantiate",
    "operations",
    "invoke",
];

/// Append-only set of reserved operation names
///
/// Names can be added at any time but never removed, so a name that was excluded once
/// stays excluded for the lifetime of the owning tracker.
#[derive(Debug)]
pub struct ReservedOperationSet {
    names: RwLock<BTreeSet<String>>,
}

impl ReservedOperationSet {
    /// An empty set, without the defaults
    pub fn empty() -> Self {
        Self {
            names: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn insert(&self, name: impl Into<String>) {
        self.names.write().unwrap_or_else(PoisonError::into_inner).insert(name.into());
    }

    pub fn extend<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.names.write().unwrap_or_else(PoisonError::into_inner);
        set.extend(names.into_iter().map(Into::into));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.read().unwrap_or_else(PoisonError::into_inner).contains(name)
    }

    /// Copy of the current names, sorted
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.names.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReservedOperationSet {
    fn default() -> Self {
        let set = Self::empty();
        set.extend(DEFAULT_RESERVED.iter().copied());
        set
    }
}
