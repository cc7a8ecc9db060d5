//! Embedded on-disk storage backend (redb).
//!
//! One table per collection, keyed by document id. redb calls block, so
//! every operation runs on the blocking thread pool.

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::backend::{Collection, StorageBackend};
use crate::error::Result;

fn table(collection: Collection) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(collection.as_str())
}

/// Documents stored in a redb database file.
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbBackend {
    /// Opens (or creates) the database at `path`.
    ///
    /// Missing parent directories are created and every collection table
    /// exists once this returns.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let open_path = path.clone();
        let db = task::spawn_blocking(move || {
            let db = Database::create(&open_path)?;
            let txn = db.begin_write()?;
            for collection in Collection::ALL {
                txn.open_table(table(collection))?;
            }
            txn.commit()?;
            Ok::<_, redb::Error>(db)
        })
        .await??;

        tracing::info!(path = %path.display(), "Opened redb document store");
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Vec<u8>>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let document = task::spawn_blocking(move || {
            let txn = db.begin_read()?;
            let table = txn.open_table(table(collection))?;
            let document = table.get(id.as_str())?.map(|guard| guard.value().to_vec());
            Ok::<_, redb::Error>(document)
        })
        .await??;
        Ok(document)
    }

    async fn put(&self, collection: Collection, id: &str, document: Vec<u8>) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || {
            let txn = db.begin_write()?;
            {
                let mut table = txn.open_table(table(collection))?;
                table.insert(id.as_str(), document.as_slice())?;
            }
            txn.commit()?;
            Ok::<_, redb::Error>(())
        })
        .await??;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let existed = task::spawn_blocking(move || {
            let txn = db.begin_write()?;
            let existed = {
                let mut table = txn.open_table(table(collection))?;
                let removed = table.remove(id.as_str())?;
                removed.is_some()
            };
            txn.commit()?;
            Ok::<_, redb::Error>(existed)
        })
        .await??;
        Ok(existed)
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>> {
        let db = Arc::clone(&self.db);
        let documents = task::spawn_blocking(move || {
            let txn = db.begin_read()?;
            let table = txn.open_table(table(collection))?;
            let mut documents = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                documents.push((key.value().to_string(), value.value().to_vec()));
            }
            Ok::<_, redb::Error>(documents)
        })
        .await??;
        Ok(documents)
    }

    fn name(&self) -> &str {
        "redb"
    }
}
