use std::path::Path;
use std::time::Duration;

use cas_object::{codec, Object, ObjectId};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{BoxError, StoreError, StoreResult};
use crate::traits::ObjectStore;

const BACKEND: &str = "sqlite";

/// How long a writer waits on a locked database before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS objects (
        sha  TEXT PRIMARY KEY,
        data BLOB NOT NULL
    )
";

fn io_err<E: Into<BoxError>>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::backend(BACKEND, context, e)
}

fn init_err<E: Into<BoxError>>(e: E) -> StoreError {
    StoreError::init(BACKEND, e)
}

/// Object store backed by SQLite, with exactly one connection.
///
/// SQLite admits a single writer, so every caller serializes through one
/// connection guarded by a mutex; this also keeps per-connection PRAGMAs in
/// force. The database runs in WAL mode and a busy timeout absorbs transient
/// lock contention from other processes instead of failing immediately.
/// Idempotency comes from `INSERT OR IGNORE` on the `sha` primary key.
pub struct SqliteObjectStore {
    conn: Mutex<Connection>,
    journal_mode: String,
}

impl SqliteObjectStore {
    /// Open (or create) the database at `path`. `":memory:"` is accepted.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(init_err)?;
        let store = Self::init(conn)?;
        info!(
            path = %path.display(),
            journal_mode = %store.journal_mode,
            "opened sqlite object store"
        );
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(init_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(init_err)?;
        // In-memory databases report "memory" here; WAL only applies to files.
        let journal_mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(init_err)?;
        conn.execute_batch(SCHEMA).map_err(init_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            journal_mode: journal_mode.to_lowercase(),
        })
    }

    /// Journal mode reported by SQLite after opening (`wal` for files).
    pub fn journal_mode(&self) -> &str {
        &self.journal_mode
    }

    /// Number of stored objects.
    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM objects", [], |row| row.get(0))
            .map_err(io_err("count objects"))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl ObjectStore for SqliteObjectStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    fn put(&self, object: &Object) -> StoreResult<ObjectId> {
        // Compress before taking the connection so callers only serialize on I/O.
        let encoded = object.encode()?;
        let inserted = self
            .conn
            .lock()
            .execute(
                "INSERT OR IGNORE INTO objects (sha, data) VALUES (?1, ?2)",
                params![encoded.id.to_hex(), encoded.compressed],
            )
            .map_err(io_err("insert"))?;
        debug!(id = %encoded.id, inserted = inserted > 0, "sqlite put");
        Ok(encoded.id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Object> {
        let compressed: Vec<u8> = self
            .conn
            .lock()
            .query_row(
                "SELECT data FROM objects WHERE sha = ?1",
                params![id.to_hex()],
                |row| row.get(0),
            )
            .optional()
            .map_err(io_err("select"))?
            .ok_or(StoreError::NotFound(*id))?;
        Ok(codec::decode(&compressed)?)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(
                "SELECT COUNT(1) FROM objects WHERE sha = ?1",
                params![id.to_hex()],
                |row| row.get(0),
            )
            .map_err(io_err("exists query"))?;
        Ok(count > 0)
    }

    fn flush(&self) -> StoreResult<usize> {
        let removed = self
            .conn
            .lock()
            .execute("DELETE FROM objects", [])
            .map_err(io_err("delete all"))?;
        info!(removed, "flushed sqlite object store");
        Ok(removed)
    }
}

impl std::fmt::Debug for SqliteObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteObjectStore")
            .field("journal_mode", &self.journal_mode)
            .finish()
    }
}
