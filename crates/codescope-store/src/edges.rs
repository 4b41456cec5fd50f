//! Edge CRUD, directional scans, and atomic resolution updates.

use crate::Store;
use codescope_core::{CodescopeError, Edge, EdgeKind};
use rusqlite::{params, Connection, Row};

const EDGE_COLUMNS: &str =
    "source_id, target_id, target_symbol, kind, confidence, file_path, line, resolved_by";

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let kind_str: String = row.get(3)?;
    Ok(Edge {
        source_id: row.get(0)?,
        target_id: row.get(1)?,
        target_symbol: row.get(2)?,
        kind: kind_str.parse().unwrap_or(EdgeKind::Calls),
        confidence: row.get(4)?,
        file_path: row.get(5)?,
        line: row.get::<_, i64>(6)? as usize,
        resolved_by: row.get(7)?,
    })
}

fn insert_edge(conn: &Connection, edge: &Edge) -> Result<(), CodescopeError> {
    conn.execute(
        "INSERT INTO edges (source_id, target_id, target_symbol, kind, confidence,
             file_path, line, resolved_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(source_id, target_symbol, kind, line) DO UPDATE SET
             target_id = excluded.target_id,
             confidence = excluded.confidence,
             resolved_by = excluded.resolved_by",
        params![
            edge.source_id,
            edge.target_id,
            edge.target_symbol,
            edge.kind.to_string(),
            edge.confidence,
            edge.file_path,
            edge.line as i64,
            edge.resolved_by,
        ],
    )
    .map_err(|e| CodescopeError::Storage(e.to_string()))?;
    Ok(())
}

/// Build a `kind IN (...)` clause for an optional kind filter.
fn kind_filter(kinds: Option<&[EdgeKind]>) -> String {
    match kinds {
        None => String::new(),
        Some(kinds) => {
            let list = kinds
                .iter()
                .map(|k| format!("'{k}'"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(" AND kind IN ({list})")
        }
    }
}

impl Store {
    /// Insert or replace a single edge.
    pub fn upsert_edge(&self, edge: &Edge) -> Result<(), CodescopeError> {
        insert_edge(&self.conn(), edge)
    }

    /// Insert or replace a batch of edges in one transaction.
    pub fn upsert_edges(&self, edges: &[Edge]) -> Result<(), CodescopeError> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        for edge in edges {
            insert_edge(&tx, edge)?;
        }
        tx.commit()
            .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    /// Edges pointing at a node, optionally filtered by kind.
    pub fn get_incoming_edges(
        &self,
        node_id: &str,
        kinds: Option<&[EdgeKind]>,
    ) -> Result<Vec<Edge>, CodescopeError> {
        self.query_edges(
            &format!(
                "SELECT {EDGE_COLUMNS} FROM edges WHERE target_id = ?1{} \
                 ORDER BY file_path, line",
                kind_filter(kinds)
            ),
            params![node_id],
        )
    }

    /// Edges leaving a node, optionally filtered by kind.
    pub fn get_outgoing_edges(
        &self,
        node_id: &str,
        kinds: Option<&[EdgeKind]>,
    ) -> Result<Vec<Edge>, CodescopeError> {
        self.query_edges(
            &format!(
                "SELECT {EDGE_COLUMNS} FROM edges WHERE source_id = ?1{} \
                 ORDER BY file_path, line",
                kind_filter(kinds)
            ),
            params![node_id],
        )
    }

    /// All edges of one kind across the index.
    pub fn get_edges_by_kind(&self, kind: EdgeKind) -> Result<Vec<Edge>, CodescopeError> {
        self.query_edges(
            &format!(
                "SELECT {EDGE_COLUMNS} FROM edges WHERE kind = ?1 ORDER BY file_path, line"
            ),
            params![kind.to_string()],
        )
    }

    /// All edges still awaiting resolution (excluding structural contains).
    pub fn unresolved_edges(&self) -> Result<Vec<Edge>, CodescopeError> {
        self.query_edges(
            &format!(
                "SELECT {EDGE_COLUMNS} FROM edges \
                 WHERE target_id IS NULL AND kind != 'contains' \
                 ORDER BY file_path, line"
            ),
            [],
        )
    }

    /// Unresolved edges sourced from the given files.
    pub fn unresolved_edges_in_files(
        &self,
        paths: &[String],
    ) -> Result<Vec<Edge>, CodescopeError> {
        let mut out = Vec::new();
        for path in paths {
            out.extend(self.query_edges(
                &format!(
                    "SELECT {EDGE_COLUMNS} FROM edges \
                     WHERE target_id IS NULL AND kind != 'contains' AND file_path = ?1 \
                     ORDER BY line"
                ),
                params![path],
            )?);
        }
        Ok(out)
    }

    /// Mark one edge resolved. A single atomic UPDATE: the edge is never
    /// observable half-resolved.
    pub fn resolve_edge(
        &self,
        edge: &Edge,
        target_id: &str,
        confidence: f64,
        resolved_by: &str,
    ) -> Result<(), CodescopeError> {
        let conn = self.conn();
        conn.execute(
            "UPDATE edges SET target_id = ?1, confidence = ?2, resolved_by = ?3
             WHERE source_id = ?4 AND target_symbol = ?5 AND kind = ?6 AND line = ?7",
            params![
                target_id,
                confidence,
                resolved_by,
                edge.source_id,
                edge.target_symbol,
                edge.kind.to_string(),
                edge.line as i64,
            ],
        )
        .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Delete all edges sourced from a file. Returns the number deleted.
    pub fn delete_edges_by_file(&self, path: &str) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        conn.execute("DELETE FROM edges WHERE file_path = ?1", params![path])
            .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    pub fn edge_count(&self) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    fn query_edges(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Edge>, CodescopeError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        let edges = stmt
            .query_map(params, edge_from_row)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(edges)
    }
}
