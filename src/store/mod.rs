//! Persistence for storefront entities.
//!
//! Two interchangeable backends sit behind [`Repository`]:
//!
//! - [`PgStore`]: one Postgres table per entity with snake_case columns. Each
//!   entity has exactly one row adapter (see [`rows`]).
//! - [`RecordStore`]: schema-less documents keyed by collection and id,
//!   stored as the entity's camelCase JSON.
//!
//! Neither backend is authoritative; a deployment picks one through
//! configuration and [`Store`] dispatches to it.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod postgres;
pub mod records;
pub mod rows;

pub use postgres::{PgStore, PgTable, TableRow};
pub use records::{DocumentStore, InMemoryDocuments, RecordStore};
#[cfg(feature = "storage-rocksdb")]
pub use records::RocksDocuments;

/// A flat record with a string id, stored in a named collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table name for Postgres and collection name for the record store.
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages.
    const NAME: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be mapped back onto its entity.
    #[error("data corruption in {collection}/{id}: {reason}")]
    DataCorruption { collection: &'static str, id: String, reason: String },

    #[error("record store error: {0}")]
    Backend(String),
}

/// CRUD contract shared by both backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All entities in creation order.
    async fn list(&self) -> Result<Vec<T>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Inserts or replaces the entity with the same id.
    async fn save(&self, entity: &T) -> Result<(), StoreError>;

    /// Returns `false` when nothing was stored under `id`.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// The backend a deployment runs against.
#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Records(RecordStore),
}

impl Store {
    /// A record store kept in process memory.
    pub fn in_memory() -> Self { Self::Records(RecordStore::in_memory()) }

    pub fn backend_name(&self) -> &'static str {
        match self { Self::Postgres(_) => "postgres", Self::Records(_) => "records" }
    }

    /// Cheap connectivity probe used by the readiness endpoint.
    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(pg) => pg.ping().await,
            Self::Records(_) => Ok(()),
        }
    }
}

#[async_trait]
impl<T: PgTable> Repository<T> for Store {
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        match self {
            Self::Postgres(s) => Repository::<T>::list(s).await,
            Self::Records(s) => Repository::<T>::list(s).await,
        }
    }

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self {
            Self::Postgres(s) => Repository::<T>::get(s, id).await,
            Self::Records(s) => Repository::<T>::get(s, id).await,
        }
    }

    async fn save(&self, entity: &T) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.save(entity).await,
            Self::Records(s) => s.save(entity).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        match self {
            Self::Postgres(s) => Repository::<T>::delete(s, id).await,
            Self::Records(s) => Repository::<T>::delete(s, id).await,
        }
    }
}
