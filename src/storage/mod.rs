//! Storage of an instance's current state.
//!
//! The executor never touches the current-state value directly; it reads
//! and writes it through a `StateStorage` backend chosen when the machine
//! type is built. Three backends ship with the crate:
//!
//! - `MemoryStorage`: a plain in-memory field (the default)
//! - `RecordStorage`: a column on a relational-style record
//! - `DocumentStorage`: a field on a document kept in a `DocumentStore`
//!
//! Backends may perform I/O but are called synchronously. No locking is
//! done around a transition: the read that validates it and the write that
//! commits it are separate calls, so two handles sharing one persisted
//! document can race.

mod document;
pub mod error;
mod memory;
mod record;

pub use document::{Document, DocumentFormat, DocumentStorage, DocumentStore, DOCUMENT_VERSION};
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use record::{Record, RecordStorage};

use crate::core::State;
use serde::{Deserialize, Serialize};

/// Field name used by the bundled backends unless configured otherwise.
pub const DEFAULT_STATE_FIELD: &str = "state";

/// Storage reserved for the current state by a backend at build time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Backend-specific field or column name
    pub name: String,

    /// Value new instances start with: the initial state's name
    pub default: String,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, initial: &State) -> Self {
        Self {
            name: name.into(),
            default: initial.name().to_string(),
        }
    }

    /// Fresh per-instance field holding the default value.
    pub fn instantiate(&self) -> StateField {
        StateField {
            name: self.name.clone(),
            value: self.default.clone(),
        }
    }
}

/// The in-memory current-state attribute carried by every instance handle.
///
/// `MemoryStorage` treats it as the source of truth; other backends keep it
/// in sync as a local copy of what they persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateField {
    name: String,
    value: String,
}

impl StateField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }
}

/// Contract between the transition executor and a persistence backend.
pub trait StateStorage<T>: Send + Sync {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Reserve storage for the current state. Called once per machine type.
    fn declare_storage_field(&self, initial: &State) -> FieldDescriptor;

    /// Prepare a freshly created instance. Default: nothing to do.
    fn initialize(&self, _data: &mut T, _field: &mut StateField) -> Result<(), StorageError> {
        Ok(())
    }

    /// Adopt `state` for an instance loaded from elsewhere. `state` is
    /// already known to be declared. Default: set the local field.
    fn restore(
        &self,
        _data: &mut T,
        field: &mut StateField,
        state: &str,
    ) -> Result<(), StorageError> {
        field.set(state);
        Ok(())
    }

    fn read_current_state(&self, data: &T, field: &StateField) -> String;

    /// Persist `new_state`. On error the transition is not committed.
    fn write_current_state(
        &self,
        data: &mut T,
        field: &mut StateField,
        new_state: &str,
    ) -> Result<(), StorageError>;
}
