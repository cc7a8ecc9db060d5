//! In-memory storage backend.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::backend::{Collection, StorageBackend};
use crate::error::{Error, Result};

type Documents = BTreeMap<(Collection, String), Vec<u8>>;

/// Documents held in a `BTreeMap`; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: RwLock<Documents>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Documents>> {
        self.documents
            .read()
            .map_err(|_| Error::backend("memory store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Documents>> {
        self.documents
            .write()
            .map_err(|_| Error::backend("memory store lock poisoned"))
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(&(collection, id.to_string())).cloned())
    }

    async fn put(&self, collection: Collection, id: &str, document: Vec<u8>) -> Result<()> {
        self.write()?.insert((collection, id.to_string()), document);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self.write()?.remove(&(collection, id.to_string())).is_some())
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(self
            .read()?
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
