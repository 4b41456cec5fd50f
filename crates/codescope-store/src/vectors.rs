//! Embedding storage: one f32 vector per node, little-endian blobs.

use crate::Store;
use codescope_core::{CodescopeError, VectorEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn encode(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<VectorEntry> {
    let blob: Vec<u8> = row.get(1)?;
    Ok(VectorEntry {
        node_id: row.get(0)?,
        embedding: decode(&blob),
        model: row.get(2)?,
    })
}

fn insert_vector(conn: &Connection, entry: &VectorEntry) -> Result<(), CodescopeError> {
    conn.execute(
        "INSERT OR REPLACE INTO vectors (node_id, embedding, dims, model)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.node_id,
            encode(&entry.embedding),
            entry.embedding.len() as i64,
            entry.model,
        ],
    )
    .map_err(|e| CodescopeError::Storage(e.to_string()))?;
    Ok(())
}

impl Store {
    /// Insert or replace the vector for a node.
    pub fn upsert_vector(&self, entry: &VectorEntry) -> Result<(), CodescopeError> {
        insert_vector(&self.conn(), entry)
    }

    /// Insert or replace a batch of vectors in one transaction.
    pub fn upsert_vectors(&self, entries: &[VectorEntry]) -> Result<(), CodescopeError> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        for entry in entries {
            insert_vector(&tx, entry)?;
        }
        tx.commit()
            .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    pub fn get_vector(&self, node_id: &str) -> Result<Option<VectorEntry>, CodescopeError> {
        let conn = self.conn();
        conn.query_row(
            "SELECT node_id, embedding, model FROM vectors WHERE node_id = ?1",
            params![node_id],
            entry_from_row,
        )
        .optional()
        .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    /// All stored vectors, in node-ID order for deterministic scans.
    pub fn all_vectors(&self) -> Result<Vec<VectorEntry>, CodescopeError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT node_id, embedding, model FROM vectors ORDER BY node_id")
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        let entries = stmt
            .query_map([], entry_from_row)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(entries)
    }

    /// Delete the vector for a node. Returns true if a row was deleted.
    pub fn delete_vector(&self, node_id: &str) -> Result<bool, CodescopeError> {
        let conn = self.conn();
        let rows = conn
            .execute("DELETE FROM vectors WHERE node_id = ?1", params![node_id])
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(rows > 0)
    }

    pub fn vector_count(&self) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(count as usize)
    }
}
