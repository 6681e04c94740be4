//! Schema-less record store.
//!
//! Entities are kept as their camelCase JSON documents, keyed by collection
//! and id. Reads tolerate missing optional fields (serde defaults on the
//! entities), which is how older documents keep loading after a field is
//! added.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Entity, Repository, StoreError};

/// Raw document access. Documents come back in ascending id order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;
    async fn remove(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}

/// Process-local documents, used for tests and single-node demos.
#[derive(Default, Clone)]
pub struct InMemoryDocuments {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
}

impl InMemoryDocuments {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl DocumentStore for InMemoryDocuments {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().insert(id.to_string(), document);
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        Ok(collections.get_mut(collection).and_then(|docs| docs.remove(id)).is_some())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map(|docs| docs.values().cloned().collect()).unwrap_or_default())
    }
}

/// Documents persisted in RocksDB under `collection/id` keys.
#[cfg(feature = "storage-rocksdb")]
#[derive(Clone)]
pub struct RocksDocuments {
    db: Arc<rocksdb::DB>,
}

#[cfg(feature = "storage-rocksdb")]
impl RocksDocuments {
    /// Opens or creates the database at `path`.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        let db = rocksdb::DB::open(&opts, path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self { db: Arc::new(db) })
    }

    fn key(collection: &str, id: &str) -> String { format!("{collection}/{id}") }
}

#[cfg(feature = "storage-rocksdb")]
#[async_trait]
impl DocumentStore for RocksDocuments {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let bytes = self.db.get(Self::key(collection, id)).map_err(|e| StoreError::Backend(e.to_string()))?;
        bytes.map(|b| serde_json::from_slice(&b)).transpose().map_err(StoreError::from)
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&document)?;
        self.db.put(Self::key(collection, id), bytes).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let key = Self::key(collection, id);
        let existed = self.db.get(&key).map_err(|e| StoreError::Backend(e.to_string()))?.is_some();
        if existed {
            self.db.delete(&key).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(existed)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let prefix = format!("{collection}/");
        let mut documents = Vec::new();
        for item in self.db.prefix_iterator(prefix.as_bytes()) {
            let (key, value) = item.map_err(|e| StoreError::Backend(e.to_string()))?;
            if !key.starts_with(prefix.as_bytes()) { break; }
            documents.push(serde_json::from_slice(&value)?);
        }
        Ok(documents)
    }
}

/// Typed repository over any [`DocumentStore`].
#[derive(Clone)]
pub struct RecordStore {
    documents: Arc<dyn DocumentStore>,
}

impl RecordStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self { Self { documents } }

    pub fn in_memory() -> Self { Self::new(Arc::new(InMemoryDocuments::new())) }

    fn decode<T: Entity>(id_hint: &str, document: Value) -> Result<T, StoreError> {
        serde_json::from_value(document).map_err(|e| StoreError::DataCorruption {
            collection: T::COLLECTION,
            id: id_hint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for RecordStore {
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        let documents = self.documents.list(T::COLLECTION).await?;
        documents
            .into_iter()
            .map(|doc| {
                let id = doc.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
                Self::decode(&id, doc)
            })
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let document = self.documents.get(T::COLLECTION, id).await?;
        document.map(|doc| Self::decode(id, doc)).transpose()
    }

    async fn save(&self, entity: &T) -> Result<(), StoreError> {
        let document = serde_json::to_value(entity)?;
        self.documents.put(T::COLLECTION, entity.id(), document).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.documents.remove(T::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Brand, Product};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn test_documents_are_camel_case() {
        let docs = InMemoryDocuments::new();
        let store = RecordStore::new(Arc::new(docs.clone()));
        let mut product = Product::create("Lámpara", dec!(12000));
        product.image_url = Some("lamp.png".into());
        store.save(&product).await.unwrap();

        let raw = docs.get("products", &product.id).await.unwrap().unwrap();
        assert_eq!(raw["imageUrl"], json!("lamp.png"));
        assert!(raw.get("image_url").is_none());

        let back: Product = store.get(&product.id).await.unwrap().unwrap();
        assert_eq!(back, product);
    }

    #[tokio::test]
    async fn test_sparse_document_loads_with_defaults() {
        let docs = InMemoryDocuments::new();
        docs.put("products", "p1", json!({
            "id": "p1", "name": "Vela", "price": "800",
            "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
        })).await.unwrap();
        let store = RecordStore::new(Arc::new(docs));
        let product: Product = store.get("p1").await.unwrap().unwrap();
        assert!(product.active);
        assert!(product.images.is_empty());
        assert_eq!(product.price, dec!(800));
    }

    #[tokio::test]
    async fn test_delete_and_list_order() {
        let store = RecordStore::in_memory();
        let first = Brand::create("Alfa");
        let second = Brand::create("Beta");
        store.save(&second).await.unwrap();
        store.save(&first).await.unwrap();

        let listed: Vec<Brand> = store.list().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|b| b.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(listed.len(), 2);
        assert_eq!(ids, sorted);

        assert!(Repository::<Brand>::delete(&store, &first.id).await.unwrap());
        assert!(!Repository::<Brand>::delete(&store, &first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_document_is_corruption() {
        let docs = InMemoryDocuments::new();
        docs.put("brands", "b1", json!({ "id": "b1" })).await.unwrap();
        let store = RecordStore::new(Arc::new(docs));
        let result: Result<Option<Brand>, _> = store.get("b1").await;
        assert!(matches!(result, Err(StoreError::DataCorruption { collection: "brands", .. })));
    }

    #[cfg(feature = "storage-rocksdb")]
    #[tokio::test]
    async fn test_rocksdb_documents_persist() {
        let dir = tempfile::tempdir().unwrap();
        let brand = Brand::create("Gamma");
        {
            let store = RecordStore::new(Arc::new(RocksDocuments::open(dir.path()).unwrap()));
            store.save(&brand).await.unwrap();
        }
        let store = RecordStore::new(Arc::new(RocksDocuments::open(dir.path()).unwrap()));
        let listed: Vec<Brand> = store.list().await.unwrap();
        assert_eq!(listed, vec![brand]);
    }
}
