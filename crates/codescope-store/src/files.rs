//! File record CRUD.

use crate::Store;
use codescope_core::{CodescopeError, FileRecord};
use rusqlite::{params, OptionalExtension, Row};

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    let indexed_ts: i64 = row.get(4)?;
    Ok(FileRecord {
        path: row.get(0)?,
        language: row.get(1)?,
        content_hash: row.get(2)?,
        size: row.get::<_, i64>(3)? as u64,
        indexed_at: chrono::DateTime::from_timestamp(indexed_ts, 0)
            .unwrap_or_default()
            .with_timezone(&chrono::Utc),
    })
}

impl Store {
    /// Insert or replace a file record.
    pub fn upsert_file(&self, file: &FileRecord) -> Result<(), CodescopeError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO files (path, language, content_hash, size, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(path) DO UPDATE SET
                language = excluded.language,
                content_hash = excluded.content_hash,
                size = excluded.size,
                indexed_at = excluded.indexed_at",
            params![
                file.path,
                file.language,
                file.content_hash,
                file.size as i64,
                file.indexed_at.timestamp(),
            ],
        )
        .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Get a file record by relative path.
    pub fn get_file(&self, path: &str) -> Result<Option<FileRecord>, CodescopeError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT path, language, content_hash, size, indexed_at FROM files WHERE path = ?1",
            params![path],
            file_from_row,
        )
        .optional()
        .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    /// All file records, ordered by path.
    pub fn all_files(&self) -> Result<Vec<FileRecord>, CodescopeError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT path, language, content_hash, size, indexed_at FROM files ORDER BY path")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        let files = stmt
            .query_map([], file_from_row)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(files)
    }

    /// Delete a file record. Cascades to its nodes, its sourced edges, and
    /// (via nodes) its vectors. Returns true if a row was deleted.
    pub fn delete_file(&self, path: &str) -> Result<bool, CodescopeError> {
        let conn = self.conn();
        let rows = conn
            .execute("DELETE FROM files WHERE path = ?1", params![path])
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(rows > 0)
    }

    pub fn file_count(&self) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(count as usize)
    }
}
