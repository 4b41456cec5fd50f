//! Versioned schema migrations, embedded at compile time.
//!
//! Each migration runs in its own transaction; the stored version is
//! monotonic and a database newer than this build is rejected rather than
//! silently downgraded.

use codescope_core::CodescopeError;
use rusqlite::Connection;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: 2,
        description: "Edge scan indexes",
        sql: include_str!("migrations/002_edge_scan_indexes.sql"),
    },
];

/// Run all pending migrations on the given connection.
pub(crate) fn run_migrations(conn: &mut Connection) -> Result<(), CodescopeError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| CodescopeError::Storage(e.to_string()))?;

    let current = current_version(conn)?;
    let newest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
    if current > newest {
        return Err(CodescopeError::StoreIntegrity(format!(
            "database schema version {current} is newer than supported version {newest}"
        )));
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tracing::info!(
            version = migration.version,
            "applying migration: {}",
            migration.description
        );
        let tx = conn
            .transaction()
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        tx.execute_batch(migration.sql).map_err(|e| {
            CodescopeError::StoreIntegrity(format!(
                "migration {} ({}) failed: {e}",
                migration.version, migration.description
            ))
        })?;
        tx.execute(
            "INSERT INTO schema_version (version, description, applied_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                migration.description,
                chrono::Utc::now().timestamp()
            ],
        )
        .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        tx.commit()
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database.
pub(crate) fn current_version(conn: &Connection) -> Result<u32, CodescopeError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| CodescopeError::Storage(e.to_string()))
}
