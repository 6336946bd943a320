use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{Map, Value};

use super::{Document, DocumentStore, FieldFilter, StorageError};

type CollectionMap = HashMap<String, BTreeMap<String, Map<String, Value>>>;

/// Mutex-guarded store used by the service binary and by tests. Documents within a collection
/// come back ordered by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<Mutex<CollectionMap>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, CollectionMap>, StorageError> {
        self.collections
            .lock()
            .map_err(|_| StorageError::Unavailable("in-memory store poisoned".to_string()))
    }

    pub fn len(&self, collection: &str) -> usize {
        self.lock()
            .map(|guard| guard.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_where(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<Document>, StorageError> {
        Ok(self
            .fetch_all(collection)?
            .into_iter()
            .filter(|document| filter.matches(document))
            .collect())
    }

    fn put(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StorageError> {
        if id.is_empty() {
            return Err(StorageError::Rejected("document id must not be empty".to_string()));
        }
        let mut guard = self.lock()?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if let Some(documents) = guard.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }
}
