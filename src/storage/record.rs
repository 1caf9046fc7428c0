//! Relational-record backend: the state is a string column on the record.

use super::{FieldDescriptor, StateField, StateStorage, StorageError, DEFAULT_STATE_FIELD};
use crate::core::State;

/// A row-like value with named string columns.
pub trait Record {
    fn column(&self, name: &str) -> Option<&str>;

    fn set_column(&mut self, name: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Clone, Debug)]
pub struct RecordStorage {
    column: String,
}

impl RecordStorage {
    pub fn new() -> Self {
        Self {
            column: DEFAULT_STATE_FIELD.to_string(),
        }
    }

    pub fn with_column(name: impl Into<String>) -> Self {
        Self {
            column: name.into(),
        }
    }
}

impl Default for RecordStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> StateStorage<T> for RecordStorage {
    fn backend(&self) -> &'static str {
        "record"
    }

    fn declare_storage_field(&self, initial: &State) -> FieldDescriptor {
        FieldDescriptor::new(self.column.clone(), initial)
    }

    /// New records get the initial state written into their column.
    fn initialize(&self, data: &mut T, field: &mut StateField) -> Result<(), StorageError> {
        data.set_column(&self.column, field.value())
    }

    /// The restored state overwrites whatever the column held.
    fn restore(
        &self,
        data: &mut T,
        field: &mut StateField,
        state: &str,
    ) -> Result<(), StorageError> {
        data.set_column(&self.column, state)?;
        field.set(state);
        Ok(())
    }

    /// The column wins; a NULL column reads as the field's value.
    fn read_current_state(&self, data: &T, field: &StateField) -> String {
        data.column(&self.column)
            .unwrap_or_else(|| field.value())
            .to_string()
    }

    fn write_current_state(
        &self,
        data: &mut T,
        field: &mut StateField,
        new_state: &str,
    ) -> Result<(), StorageError> {
        data.set_column(&self.column, new_state)?;
        field.set(new_state);
        Ok(())
    }
}
