//! codescope-store: SQLite persistence for the codescope knowledge graph.
//!
//! Uses rusqlite with bundled SQLite, WAL mode, and embedded migrations.
//! The store is the single source of truth for graph topology: every
//! traversal works over these tables by node ID rather than an in-memory
//! object graph.
//!
//! Concurrency model: one writer (guarded by an advisory lock file next to
//! the database), any number of readers (WAL snapshots). Every public
//! mutation is flushed before returning; bulk extractor writes go through
//! the `*_batch` APIs, which run a single transaction per file.

use codescope_core::CodescopeError;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

mod edges;
mod files;
mod lock;
mod migrations;
mod nodes;
mod vectors;

pub use lock::StoreLock;

/// Name of the advisory writer lock file, next to the database.
const LOCK_FILE_NAME: &str = "store.lock";

/// SQLite-backed storage for files, nodes, edges, and vectors.
pub struct Store {
    conn: Mutex<Connection>,
    /// Held for the lifetime of a writable store; released on drop.
    _lock: Option<StoreLock>,
}

impl Store {
    /// Open (or create) a store at the given database path, acquiring the
    /// writer lock with the given timeout.
    pub fn open(db_path: &Path, lock_timeout: Duration) -> Result<Self, CodescopeError> {
        let dir = db_path
            .parent()
            .ok_or_else(|| CodescopeError::Storage(format!("no parent dir for {}", db_path.display())))?;
        std::fs::create_dir_all(dir)?;

        let lock = StoreLock::acquire(&dir.join(LOCK_FILE_NAME), lock_timeout)?;

        let mut conn =
            Connection::open(db_path).map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Self::apply_pragmas(&conn)?;
        migrations::run_migrations(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            _lock: Some(lock),
        })
    }

    /// Open an in-memory store (tests). No lock file is involved.
    pub fn open_in_memory() -> Result<Self, CodescopeError> {
        let mut conn =
            Connection::open_in_memory().map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        migrations::run_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            _lock: None,
        })
    }

    fn apply_pragmas(conn: &Connection) -> Result<(), CodescopeError> {
        // WAL for concurrent readers while the single writer commits.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.pragma_update(None, "cache_size", -64000i64)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.pragma_update(None, "temp_store", "MEMORY")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Current schema version (highest applied migration).
    pub fn schema_version(&self) -> Result<u32, CodescopeError> {
        migrations::current_version(&self.conn())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }
}
