//! # Storage Port
//!
//! The persistence capability consumed by the relayer, registry, and status
//! ledger. Implementations must be process-crash-safe for `put`/`append`
//! that have returned `Ok`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file adapter).
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Keyed insert found an existing record and was told not to replace it.
    #[error("Record already exists: {collection}/{key}")]
    AlreadyExists {
        /// Collection name.
        collection: String,
        /// Record key.
        key: String,
    },
}

/// Keyed + append-only record storage over named collections.
///
/// All records are JSON values; typed accessors are provided on top of the
/// raw operations. Implementations synchronize internally — every method
/// takes `&self`.
pub trait RecordStore: Send + Sync {
    /// Fetch a keyed record.
    fn get_raw(&self, collection: &str, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Insert or replace a keyed record.
    fn put_raw(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Insert a keyed record only if the key is absent.
    fn put_raw_if_absent(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Append a record to a collection's list.
    fn append_raw(&self, collection: &str, record: serde_json::Value) -> Result<(), StoreError>;

    /// All list records of a collection, in append order.
    fn list_raw(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError>;

    /// All keyed records of a collection.
    fn scan_raw(&self, collection: &str) -> Result<Vec<(String, serde_json::Value)>, StoreError>;
}

/// Typed convenience accessors over [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// Fetch and decode a keyed record.
    fn get<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(collection, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Encode and store a keyed record.
    fn put<T: Serialize>(&self, collection: &str, key: &str, record: &T) -> Result<(), StoreError> {
        self.put_raw(collection, key, serde_json::to_value(record)?)
    }

    /// Encode and store a keyed record, failing if the key exists.
    fn put_if_absent<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        self.put_raw_if_absent(collection, key, serde_json::to_value(record)?)
    }

    /// Encode and append a list record.
    fn append<T: Serialize>(&self, collection: &str, record: &T) -> Result<(), StoreError> {
        self.append_raw(collection, serde_json::to_value(record)?)
    }

    /// Fetch and decode all list records.
    fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        self.list_raw(collection)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(StoreError::from))
            .collect()
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
