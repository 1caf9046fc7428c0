//! Document-store backend.
//!
//! Instances are saved as versioned documents in a `DocumentStore`. A
//! transition updates the stored document's state field in place, the way
//! a document database applies a `$set`, and only then updates the local
//! copy on the handle.

use super::{FieldDescriptor, StateField, StateStorage, StorageError, DEFAULT_STATE_FIELD};
use crate::core::State;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Version identifier for the stored document envelope
pub const DOCUMENT_VERSION: u32 = 1;

/// A value that can be stored as a document.
pub trait Document: Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;
}

/// Encoding used for stored documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Binary,
}

impl DocumentFormat {
    fn encode<V: Serialize>(self, value: &V) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::Json => serde_json::to_vec(value)
                .map_err(|e| StorageError::SerializationFailed(e.to_string())),
            Self::Binary => bincode::serialize(value)
                .map_err(|e| StorageError::SerializationFailed(e.to_string())),
        }
    }

    fn decode<V: DeserializeOwned>(self, bytes: &[u8]) -> Result<V, StorageError> {
        match self {
            Self::Json => serde_json::from_slice(bytes)
                .map_err(|e| StorageError::DeserializationFailed(e.to_string())),
            Self::Binary => bincode::deserialize(bytes)
                .map_err(|e| StorageError::DeserializationFailed(e.to_string())),
        }
    }
}

/// Envelope written for every stored document.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredDocument {
    version: u32,
    id: Uuid,
    state: String,
    updated_at: DateTime<Utc>,
    payload: Vec<u8>,
}

/// Shared, in-process document collection.
///
/// Cloning the store clones a handle to the same collection.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    format: DocumentFormat,
    documents: Arc<RwLock<HashMap<Uuid, Vec<u8>>>>,
}

impl DocumentStore {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            documents: Arc::default(),
        }
    }

    /// Insert or replace a document together with its current state.
    pub fn save<D: Document>(&self, document: &D, state: &str) -> Result<(), StorageError> {
        let stored = StoredDocument {
            version: DOCUMENT_VERSION,
            id: document.id(),
            state: state.to_string(),
            updated_at: Utc::now(),
            payload: self.format.encode(document)?,
        };
        self.put(&stored)
    }

    /// Load a document and its stored state.
    pub fn load<D: Document>(&self, id: Uuid) -> Result<(D, String), StorageError> {
        let stored = self.get(id)?;
        let document = self.format.decode(&stored.payload)?;
        Ok((document, stored.state))
    }

    pub fn state_of(&self, id: Uuid) -> Result<String, StorageError> {
        Ok(self.get(id)?.state)
    }

    pub fn updated_at(&self, id: Uuid) -> Result<DateTime<Utc>, StorageError> {
        Ok(self.get(id)?.updated_at)
    }

    /// Set the stored state of an existing document.
    pub fn update_state(&self, id: Uuid, state: &str) -> Result<(), StorageError> {
        let mut stored = self.get(id)?;
        stored.state = state.to_string();
        stored.updated_at = Utc::now();
        self.put(&stored)
    }

    /// Ids of every document whose stored state is `state`, sorted.
    pub fn ids_in_state(&self, state: &str) -> Result<Vec<Uuid>, StorageError> {
        let encoded: Vec<Vec<u8>> = self
            .documents
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect();
        let mut ids = Vec::new();
        for bytes in encoded {
            let stored = check_version(self.format.decode(&bytes)?)?;
            if stored.state == state {
                ids.push(stored.id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        Ok(documents.remove(&id).is_some())
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, id: Uuid) -> Result<StoredDocument, StorageError> {
        let bytes = self
            .documents
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(StorageError::DocumentNotFound { id })?;
        check_version(self.format.decode(&bytes)?)
    }

    fn put(&self, stored: &StoredDocument) -> Result<(), StorageError> {
        let bytes = self.format.encode(stored)?;
        let mut documents = self.documents.write().map_err(|_| poisoned())?;
        documents.insert(stored.id, bytes);
        Ok(())
    }
}

fn check_version(stored: StoredDocument) -> Result<StoredDocument, StorageError> {
    if stored.version != DOCUMENT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: stored.version,
            supported: DOCUMENT_VERSION,
        });
    }
    Ok(stored)
}

fn poisoned() -> StorageError {
    StorageError::WriteFailed {
        reason: "document store lock poisoned".to_string(),
    }
}

/// Backend persisting the current state as a field on a stored document.
#[derive(Clone, Debug)]
pub struct DocumentStorage {
    store: DocumentStore,
    field_name: String,
}

impl DocumentStorage {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            field_name: DEFAULT_STATE_FIELD.to_string(),
        }
    }

    /// Keep the state under `name` instead of the default field.
    pub fn with_field(store: DocumentStore, name: impl Into<String>) -> Self {
        Self {
            store,
            field_name: name.into(),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

impl<T: Document> StateStorage<T> for DocumentStorage {
    fn backend(&self) -> &'static str {
        "document"
    }

    fn declare_storage_field(&self, initial: &State) -> FieldDescriptor {
        FieldDescriptor::new(self.field_name.clone(), initial)
    }

    fn read_current_state(&self, _data: &T, field: &StateField) -> String {
        field.value().to_string()
    }

    /// Fails with `DocumentNotFound` if the document was never saved.
    fn write_current_state(
        &self,
        data: &mut T,
        field: &mut StateField,
        new_state: &str,
    ) -> Result<(), StorageError> {
        self.store.update_state(data.id(), new_state)?;
        field.set(new_state);
        Ok(())
    }
}
