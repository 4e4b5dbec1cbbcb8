use std::path::{Path, PathBuf};

use cas_object::{codec, Object, ObjectId};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::{debug, info};

use crate::error::{BoxError, StoreError, StoreResult};
use crate::traits::ObjectStore;

const BACKEND: &str = "redb";

/// Single namespace: hex address bytes -> deflated object.
const OBJECTS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("objects");

fn io_err<E: Into<BoxError>>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::backend(BACKEND, context, e)
}

fn init_err<E: Into<BoxError>>(e: E) -> StoreError {
    StoreError::init(BACKEND, e)
}

/// Object store on top of redb, an embedded ordered key-value engine.
///
/// Each put runs in its own write transaction that reads the key first and
/// only inserts when it is absent, so duplicate content never rewrites an
/// entry. redb admits one writer at a time and serves readers from MVCC
/// snapshots, which makes the store safe to share across threads.
pub struct RedbObjectStore {
    db: Database,
    path: PathBuf,
}

impl RedbObjectStore {
    /// Open (or create) the database file at `path`.
    ///
    /// The `objects` table is created eagerly so read transactions never see
    /// a missing table.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path).map_err(init_err)?;

        let txn = db.begin_write().map_err(init_err)?;
        txn.open_table(OBJECTS).map_err(init_err)?;
        txn.commit().map_err(init_err)?;

        info!(path = %path.display(), "opened redb object store");
        Ok(Self { db, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored objects.
    pub fn len(&self) -> StoreResult<usize> {
        let txn = self.db.begin_read().map_err(io_err("begin read"))?;
        let table = txn.open_table(OBJECTS).map_err(io_err("open table"))?;
        let len = table.len().map_err(io_err("count entries"))?;
        Ok(len as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl ObjectStore for RedbObjectStore {
    fn name(&self) -> &str {
        "redb"
    }

    fn put(&self, object: &Object) -> StoreResult<ObjectId> {
        let encoded = object.encode()?;
        let key = encoded.id.to_hex();

        let txn = self.db.begin_write().map_err(io_err("begin write"))?;
        let inserted = {
            let mut table = txn.open_table(OBJECTS).map_err(io_err("open table"))?;
            let present = table
                .get(key.as_bytes())
                .map_err(io_err("read key"))?
                .is_some();
            if !present {
                table
                    .insert(key.as_bytes(), encoded.compressed.as_slice())
                    .map_err(io_err("insert"))?;
            }
            !present
        };

        if inserted {
            txn.commit().map_err(io_err("commit"))?;
        } else {
            txn.abort().map_err(io_err("abort"))?;
        }
        debug!(id = %encoded.id, inserted, "redb put");
        Ok(encoded.id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        let key = id.to_hex();
        let txn = self.db.begin_read().map_err(io_err("begin read"))?;
        let table = txn.open_table(OBJECTS).map_err(io_err("open table"))?;
        let compressed = table
            .get(key.as_bytes())
            .map_err(io_err("read key"))?
            .map(|guard| guard.value().to_vec())
            .ok_or(StoreError::NotFound(*id))?;
        Ok(codec::decode(&compressed)?)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let key = id.to_hex();
        let txn = self.db.begin_read().map_err(io_err("begin read"))?;
        let table = txn.open_table(OBJECTS).map_err(io_err("open table"))?;
        let present = table
            .get(key.as_bytes())
            .map_err(io_err("read key"))?
            .is_some();
        Ok(present)
    }

    fn flush(&self) -> StoreResult<usize> {
        let txn = self.db.begin_write().map_err(io_err("begin write"))?;
        let removed = {
            let mut table = txn.open_table(OBJECTS).map_err(io_err("open table"))?;
            let removed = table.len().map_err(io_err("count entries"))?;
            table.retain(|_, _| false).map_err(io_err("clear table"))?;
            removed
        };
        txn.commit().map_err(io_err("commit"))?;
        info!(removed, "flushed redb object store");
        Ok(removed as usize)
    }
}

impl std::fmt::Debug for RedbObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbObjectStore")
            .field("path", &self.path)
            .finish()
    }
}
