//! # Storage Adapters
//!
//! Two [`RecordStore`] implementations: an in-memory map for tests and
//! single-process demos, and a single-document JSON file store whose every
//! mutation is flushed with a write-temp-then-rename so a crash never leaves
//! a torn document behind.

use crate::ports::{RecordStore, StoreError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The whole persisted document: keyed maps and append-only lists, both
/// grouped by collection name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Document {
    keyed: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    lists: BTreeMap<String, Vec<serde_json::Value>>,
}

impl Document {
    fn get(&self, collection: &str, key: &str) -> Option<serde_json::Value> {
        self.keyed.get(collection).and_then(|c| c.get(key)).cloned()
    }

    fn put(&mut self, collection: &str, key: &str, record: serde_json::Value) {
        self.keyed
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
    }

    fn append(&mut self, collection: &str, record: serde_json::Value) {
        self.lists.entry(collection.to_string()).or_default().push(record);
    }
}

/// In-memory record store.
#[derive(Default)]
pub struct InMemoryStore {
    doc: RwLock<Document>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn get_raw(&self, collection: &str, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.doc.read().get(collection, key))
    }

    fn put_raw(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.doc.write().put(collection, key, record);
        Ok(())
    }

    fn put_raw_if_absent(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut doc = self.doc.write();
        if doc.get(collection, key).is_some() {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        doc.put(collection, key, record);
        Ok(())
    }

    fn append_raw(&self, collection: &str, record: serde_json::Value) -> Result<(), StoreError> {
        self.doc.write().append(collection, record);
        Ok(())
    }

    fn list_raw(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        Ok(self.doc.read().lists.get(collection).cloned().unwrap_or_default())
    }

    fn scan_raw(&self, collection: &str) -> Result<Vec<(String, serde_json::Value)>, StoreError> {
        Ok(self
            .doc
            .read()
            .keyed
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}

/// JSON file-backed record store.
///
/// The full document is held in memory and rewritten on every mutation;
/// record volumes here are small (orders, mappings, statuses), so simplicity
/// wins over incremental writes.
pub struct JsonFileStore {
    path: PathBuf,
    doc: RwLock<Document>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let doc = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            Document::default()
        };
        debug!(path = %path.display(), "Opened record store");
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    /// Serialize the document and atomically replace the file.
    fn flush(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn get_raw(&self, collection: &str, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.doc.read().get(collection, key))
    }

    fn put_raw(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut doc = self.doc.write();
        doc.put(collection, key, record);
        self.flush(&doc)
    }

    fn put_raw_if_absent(
        &self,
        collection: &str,
        key: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut doc = self.doc.write();
        if doc.get(collection, key).is_some() {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        doc.put(collection, key, record);
        self.flush(&doc)
    }

    fn append_raw(&self, collection: &str, record: serde_json::Value) -> Result<(), StoreError> {
        let mut doc = self.doc.write();
        doc.append(collection, record);
        self.flush(&doc)
    }

    fn list_raw(&self, collection: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        Ok(self.doc.read().lists.get(collection).cloned().unwrap_or_default())
    }

    fn scan_raw(&self, collection: &str) -> Result<Vec<(String, serde_json::Value)>, StoreError> {
        Ok(self
            .doc
            .read()
            .keyed
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}
