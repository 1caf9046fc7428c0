//! Built machine types.

use crate::core::{Event, MachineDescriptor};
use crate::executor::machine::Machine;
use crate::executor::transition::Trigger;
use crate::registry::{Callback, CallbackIndex, ClassId, Phase};
use crate::storage::{DocumentStore, FieldDescriptor, Record, StateStorage, StorageError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A machine type: the validated descriptor, the hook index covering the
/// type and its ancestors, and the storage backend.
///
/// Built once by `MachineBuilder` and shared by every instance.
pub struct MachineClass<T> {
    id: ClassId,
    name: String,
    lineage: Vec<ClassId>,
    descriptor: Arc<MachineDescriptor>,
    index: CallbackIndex<T>,
    storage: Arc<dyn StateStorage<T>>,
    field: FieldDescriptor,
}

impl<T> MachineClass<T> {
    pub(crate) fn new(
        id: ClassId,
        name: String,
        lineage: Vec<ClassId>,
        descriptor: Arc<MachineDescriptor>,
        index: CallbackIndex<T>,
        storage: Arc<dyn StateStorage<T>>,
        field: FieldDescriptor,
    ) -> Self {
        Self {
            id,
            name,
            lineage,
            descriptor,
            index,
            storage,
            field,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// This type followed by its ancestors, most-derived first.
    pub fn lineage(&self) -> &[ClassId] {
        &self.lineage
    }

    /// Check if `other` is this type or one of its ancestors.
    pub fn extends(&self, other: &MachineClass<T>) -> bool {
        self.lineage.contains(&other.id)
    }

    pub fn descriptor(&self) -> &MachineDescriptor {
        &self.descriptor
    }

    pub(crate) fn descriptor_handle(&self) -> Arc<MachineDescriptor> {
        Arc::clone(&self.descriptor)
    }

    pub fn index(&self) -> &CallbackIndex<T> {
        &self.index
    }

    pub(crate) fn storage(&self) -> &dyn StateStorage<T> {
        self.storage.as_ref()
    }

    pub(crate) fn storage_handle(&self) -> Arc<dyn StateStorage<T>> {
        Arc::clone(&self.storage)
    }

    pub fn backend(&self) -> &'static str {
        self.storage.backend()
    }

    /// Storage reserved for the current state at build time.
    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    /// Hooks that fire for `(phase, event_name)` on instances of this type,
    /// in execution order.
    pub fn hooks(&self, phase: Phase, event_name: &str) -> Vec<&Callback<T>> {
        self.index.lookup(&self.lineage, phase, event_name)
    }

    /// The "is in state" predicate for a declared state.
    pub fn predicate(&self, state: &str) -> Option<StatePredicate> {
        self.descriptor
            .state(state)
            .map(|s| StatePredicate::new(s.name(), &self.field.name))
    }

    /// One predicate per declared state, keyed by state name.
    pub fn predicates(&self) -> BTreeMap<String, StatePredicate> {
        self.descriptor
            .states()
            .iter()
            .map(|s| {
                let predicate = StatePredicate::new(s.name(), &self.field.name);
                (s.name().to_string(), predicate)
            })
            .collect()
    }

    /// The trigger for a declared event.
    pub fn trigger(&self, event: &str) -> Option<Trigger> {
        self.descriptor.event(event).map(|e| Trigger::new(self.id, e.clone()))
    }

    /// One trigger per declared event, keyed by event name.
    pub fn triggers(&self) -> BTreeMap<String, Trigger> {
        self.descriptor
            .events()
            .iter()
            .map(|e| (e.name().to_string(), Trigger::new(self.id, e.clone())))
            .collect()
    }

    pub fn events(&self) -> BTreeMap<&str, &Event> {
        self.descriptor.event_map()
    }
}

impl<T> MachineClass<T> {
    /// Create an instance in the initial state.
    pub fn instantiate(self: &Arc<Self>, data: T) -> Result<Machine<T>, StorageError> {
        let mut data = data;
        let mut field = self.field.instantiate();
        self.storage.initialize(&mut data, &mut field)?;
        Ok(Machine::new(Arc::clone(self), data, field))
    }

    /// Rebuild a handle for an instance whose current state was persisted
    /// earlier. `state` must be declared by this type; the backend adopts
    /// it, replacing whatever the instance carried.
    pub fn restore(self: &Arc<Self>, data: T, state: &str) -> Result<Machine<T>, StorageError> {
        if !self.descriptor.has_state(state) {
            return Err(StorageError::UndeclaredState {
                state: state.to_string(),
            });
        }
        let mut data = data;
        let mut field = self.field.instantiate();
        self.storage.restore(&mut data, &mut field, state)?;
        Ok(Machine::new(Arc::clone(self), data, field))
    }
}

impl<T> fmt::Debug for MachineClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .field("descriptor", &self.descriptor)
            .field("backend", &self.storage.backend())
            .finish()
    }
}

/// Predicate answering whether an instance is in one particular state.
///
/// # Example
///
/// ```rust
/// use statu::machine;
///
/// struct Lamp;
///
/// let lamp = machine! {
///     Lamp {
///         initial: off,
///         states: [on],
///         events: {
///             switch_on: [off] => on,
///         }
///     }
/// }
/// .build()
/// .unwrap();
///
/// let is_on = lamp.predicate("on").unwrap();
/// let mut machine = lamp.instantiate(Lamp).unwrap();
/// assert!(!is_on.check(&machine));
/// machine.fire("switch_on").unwrap();
/// assert!(is_on.check(&machine));
/// ```
///
/// The same predicate filters persisted instances without building a
/// handle for each: `matches_record` reads the type's state column and
/// `select` queries a `DocumentStore`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatePredicate {
    state: String,
    field: String,
}

impl StatePredicate {
    fn new(state: &str, field: &str) -> Self {
        Self {
            state: state.to_string(),
            field: field.to_string(),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Column or field the owning type keeps its state in.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn check<T>(&self, machine: &Machine<T>) -> bool {
        machine.current_state() == self.state
    }

    /// Check a stored record's state column.
    pub fn matches_record<R: Record>(&self, record: &R) -> bool {
        record.column(&self.field) == Some(self.state.as_str())
    }

    /// Ids of the stored documents in this state.
    pub fn select(&self, store: &DocumentStore) -> Result<Vec<Uuid>, StorageError> {
        store.ids_in_state(&self.state)
    }
}
