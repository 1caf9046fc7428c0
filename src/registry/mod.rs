//! Callback registry.
//!
//! Hooks are registered against the machine type that declares them and
//! are never merged into another type's table. Each type owns one
//! `HookTable`, keyed in the `CallbackIndex` by the type's `ClassId`.
//! Looking hooks up walks a lineage (most-derived type first) and
//! concatenates every table found along the way, so a hook declared on a
//! base type and a hook declared on a derived type for the same event both
//! fire without either shadowing the other.

mod hook;

pub use hook::{Callback, HookAction, HookOutcome, Phase};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of one machine type.
///
/// Two machine types never share an id, even if they share a name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ClassId(Uuid);

impl ClassId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Before/after hooks declared directly on one machine type, grouped by
/// event name in declaration order.
pub struct HookTable<T> {
    before: HashMap<String, Vec<Callback<T>>>,
    after: HashMap<String, Vec<Callback<T>>>,
}

impl<T> HookTable<T> {
    pub fn new() -> Self {
        Self {
            before: HashMap::new(),
            after: HashMap::new(),
        }
    }

    /// Append a callback after any already registered for its phase and
    /// event.
    pub fn push(&mut self, callback: Callback<T>) {
        let slot = match callback.phase() {
            Phase::Before => &mut self.before,
            Phase::After => &mut self.after,
        };
        slot.entry(callback.event_name().to_string())
            .or_default()
            .push(callback);
    }

    pub fn hooks(&self, phase: Phase, event_name: &str) -> &[Callback<T>] {
        let slot = match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        };
        slot.get(event_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.before.values().chain(self.after.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HookTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hook tables of a machine type and all its ancestors, keyed by type
/// identity.
pub struct CallbackIndex<T> {
    entries: HashMap<ClassId, Arc<HookTable<T>>>,
}

impl<T> CallbackIndex<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A new index holding every entry of `self` plus `table` under `owner`.
    ///
    /// The parent's tables are shared, not copied, and are left untouched.
    pub fn with_entry(&self, owner: ClassId, table: HookTable<T>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert(owner, Arc::new(table));
        Self { entries }
    }

    pub fn entry(&self, owner: ClassId) -> Option<&HookTable<T>> {
        self.entries.get(&owner).map(Arc::as_ref)
    }

    /// Hooks for `(phase, event_name)` across `lineage`, visited in the
    /// order given (most-derived first).
    pub fn lookup(&self, lineage: &[ClassId], phase: Phase, event_name: &str) -> Vec<&Callback<T>> {
        lineage
            .iter()
            .filter_map(|id| self.entries.get(id))
            .flat_map(|table| table.hooks(phase, event_name))
            .collect()
    }
}

impl<T> Default for CallbackIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
