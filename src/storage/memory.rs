//! Default backend: the state lives only on the instance handle.

use super::{FieldDescriptor, StateField, StateStorage, StorageError, DEFAULT_STATE_FIELD};
use crate::core::State;

#[derive(Clone, Debug)]
pub struct MemoryStorage {
    field_name: String,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            field_name: DEFAULT_STATE_FIELD.to_string(),
        }
    }

    pub fn with_field(name: impl Into<String>) -> Self {
        Self {
            field_name: name.into(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateStorage<T> for MemoryStorage {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn declare_storage_field(&self, initial: &State) -> FieldDescriptor {
        FieldDescriptor::new(self.field_name.clone(), initial)
    }

    fn read_current_state(&self, _data: &T, field: &StateField) -> String {
        field.value().to_string()
    }

    fn write_current_state(
        &self,
        _data: &mut T,
        field: &mut StateField,
        new_state: &str,
    ) -> Result<(), StorageError> {
        field.set(new_state);
        Ok(())
    }
}
