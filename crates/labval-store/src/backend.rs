//! Storage backend trait and factory.
//!
//! A backend stores opaque JSON documents, grouped in collections and keyed
//! by document id. It knows nothing about algorithms or workflows; the
//! typed [`Store`](crate::Store) sits on top.
//!
//! # Backends
//!
//! - `MemoryBackend`: `BTreeMap` behind a lock, for tests and throwaway servers
//! - `RedbBackend`: embedded on-disk key-value store

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::embedded::RedbBackend;
use crate::error::{Error, Result};
use crate::memory::MemoryBackend;

/// Document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Algorithm documents
    Algorithms,
    /// Workflow documents
    Workflows,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 2] = [Collection::Algorithms, Collection::Workflows];

    /// Collection name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Algorithms => "algorithms",
            Collection::Workflows => "workflows",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract document storage.
///
/// Implementations must be safe to share between request handlers. Writes
/// replace the whole document; there is no conflict detection.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads a document.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>>;

    /// Inserts or replaces a document.
    async fn put(&self, collection: Collection, id: &str, document: Vec<u8>) -> Result<()>;

    /// Deletes a document, returning whether it existed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;

    /// Reads every document of a collection, ordered by id.
    async fn scan(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>>;

    /// Get the backend name for diagnostics.
    fn name(&self) -> &str;

    /// Check if the backend is ready to serve requests.
    fn is_ready(&self) -> bool {
        true
    }
}

/// Create a storage backend based on configuration.
///
/// # Errors
///
/// Returns [`Error::Config`] for an unknown backend or a redb backend
/// without a path, and a backend error when the database cannot be opened.
pub async fn create_storage_backend(config: &StoreConfig) -> Result<Arc<dyn StorageBackend>> {
    match config.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory document store");
            Ok(Arc::new(MemoryBackend::new()))
        }
        "redb" => {
            let path = config
                .path
                .clone()
                .ok_or_else(|| Error::config("the redb backend requires a path"))?;
            let backend = RedbBackend::open(path).await?;
            Ok(Arc::new(backend))
        }
        other => Err(Error::config(format!(
            "unknown storage backend '{other}' (expected \"memory\" or \"redb\")"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Algorithms.to_string(), "algorithms");
        assert_eq!(Collection::Workflows.as_str(), "workflows");
    }

    #[tokio::test]
    async fn test_create_memory_backend() {
        let backend = create_storage_backend(&StoreConfig::memory()).await.unwrap();
        assert_eq!(backend.name(), "memory");
        assert!(backend.is_ready());
    }

    #[tokio::test]
    async fn test_create_redb_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("labval.redb");
        let backend = create_storage_backend(&StoreConfig::redb(&path)).await.unwrap();
        assert_eq!(backend.name(), "redb");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_redb_requires_path() {
        let config = StoreConfig {
            backend: "redb".into(),
            path: None,
        };
        let err = create_storage_backend(&config).await.err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let config = StoreConfig {
            backend: "mongodb".into(),
            path: None,
        };
        let err = create_storage_backend(&config).await.err().unwrap();
        assert!(err.to_string().contains("unknown storage backend 'mongodb'"));
    }
}
