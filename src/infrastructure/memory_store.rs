use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::ports::{DocumentStore, StoreError};

type Document = Map<String, Value>;
type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-process implementation of the [`DocumentStore`] port.
///
/// Stands in for the remote document database: ids are assigned by the
/// store, writes are atomic per document, and there are no transactions
/// across documents or collections. Backs the binary and every test.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::ReadFailed("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::WriteFailed("store lock poisoned".to_string()))
    }

    fn into_document(doc: Value) -> Result<Document, StoreError> {
        match doc {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::WriteFailed(format!(
                "document must be a JSON object, got {}",
                other
            ))),
        }
    }

    fn with_id(id: &str, doc: &Document) -> Value {
        let mut out = doc.clone();
        out.insert("id".to_string(), Value::String(id.to_string()));
        Value::Object(out)
    }

    fn matches(id: &str, doc: &Document, field: &str, value: &Value) -> bool {
        if field == "id" {
            value.as_str() == Some(id)
        } else {
            doc.get(field) == Some(value)
        }
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        let doc = Self::into_document(doc)?;
        let id = Uuid::new_v4().to_string();
        let mut guard = self.write()?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let doc = Self::into_document(doc)?;
        let mut guard = self.write()?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| Self::with_id(id, doc)))
    }

    fn get_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .map(|docs| docs.iter().map(|(id, doc)| Self::with_id(id, doc)).collect())
            .unwrap_or_default())
    }

    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(id, doc)| Self::matches(id, doc, field, value))
                    .map(|(id, doc)| Self::with_id(id, doc))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn query_in(
        &self,
        collection: &str,
        field: &str,
        values: &[String],
    ) -> Result<Vec<Value>, StoreError> {
        if values.is_empty() {
            return Err(StoreError::EmptyInQuery(collection.to_string()));
        }
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(id, doc)| {
                        values
                            .iter()
                            .any(|v| Self::matches(id, doc, field, &Value::String(v.clone())))
                    })
                    .map(|(id, doc)| Self::with_id(id, doc))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        let fields = Self::into_document(fields)?;
        let mut guard = self.write()?;
        let doc = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        let doc = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        let current = match doc.get(field) {
            None => 0,
            Some(v) => v.as_i64().ok_or_else(|| {
                StoreError::WriteFailed(format!("field '{}' is not an integer", field))
            })?,
        };
        doc.insert(field.to_string(), Value::from(current + delta));
        Ok(())
    }
}
