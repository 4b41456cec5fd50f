//! Node CRUD and range scans.

use crate::Store;
use codescope_core::{CodescopeError, Node, NodeKind, Span};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NODE_COLUMNS: &str = "id, kind, name, qualified_name, language, file_path, \
     start_line, start_column, end_line, end_column, signature, docstring, is_exported, updated_at";

fn node_from_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    let kind_str: String = row.get(1)?;
    let updated_ts: i64 = row.get(13)?;
    Ok(Node {
        id: row.get(0)?,
        kind: kind_str.parse().unwrap_or(NodeKind::Unknown),
        name: row.get(2)?,
        qualified_name: row.get(3)?,
        language: row.get(4)?,
        file_path: row.get(5)?,
        span: Span {
            start_line: row.get::<_, i64>(6)? as usize,
            start_column: row.get::<_, i64>(7)? as usize,
            end_line: row.get::<_, i64>(8)? as usize,
            end_column: row.get::<_, i64>(9)? as usize,
        },
        signature: row.get(10)?,
        docstring: row.get(11)?,
        is_exported: row.get(12)?,
        updated_at: chrono::DateTime::from_timestamp(updated_ts, 0)
            .unwrap_or_default()
            .with_timezone(&chrono::Utc),
    })
}

fn insert_node(conn: &Connection, node: &Node) -> Result<(), CodescopeError> {
    conn.execute(
        "INSERT INTO nodes (id, kind, name, qualified_name, language, file_path,
             start_line, start_column, end_line, end_column, signature, docstring,
             is_exported, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             language = excluded.language,
             end_line = excluded.end_line,
             end_column = excluded.end_column,
             signature = excluded.signature,
             docstring = excluded.docstring,
             is_exported = excluded.is_exported,
             updated_at = excluded.updated_at",
        params![
            node.id,
            node.kind.to_string(),
            node.name,
            node.qualified_name,
            node.language,
            node.file_path,
            node.span.start_line as i64,
            node.span.start_column as i64,
            node.span.end_line as i64,
            node.span.end_column as i64,
            node.signature,
            node.docstring,
            node.is_exported,
            node.updated_at.timestamp(),
        ],
    )
    .map_err(|e| CodescopeError::Storage(e.to_string()))?;
    Ok(())
}

impl Store {
    /// Insert or replace a single node.
    pub fn upsert_node(&self, node: &Node) -> Result<(), CodescopeError> {
        insert_node(&self.conn(), node)
    }

    /// Insert or replace a batch of nodes in one transaction.
    pub fn upsert_nodes(&self, nodes: &[Node]) -> Result<(), CodescopeError> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        for node in nodes {
            insert_node(&tx, node)?;
        }
        tx.commit()
            .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    /// Point lookup by node ID.
    pub fn get_node_by_id(&self, id: &str) -> Result<Option<Node>, CodescopeError> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1"),
            params![id],
            node_from_row,
        )
        .optional()
        .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    /// All nodes defined in a file, ordered by source position.
    pub fn get_nodes_by_file(&self, path: &str) -> Result<Vec<Node>, CodescopeError> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE file_path = ?1 \
                 ORDER BY start_line, start_column"
            ),
            params![path],
        )
    }

    /// All nodes of one kind across the index.
    pub fn get_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>, CodescopeError> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE kind = ?1 \
                 ORDER BY file_path, start_line"
            ),
            params![kind.to_string()],
        )
    }

    /// All nodes with the given simple name, in file-path order (the order
    /// the resolver's global fallback relies on).
    pub fn get_nodes_by_name(&self, name: &str) -> Result<Vec<Node>, CodescopeError> {
        self.query_nodes(
            &format!(
                "SELECT {NODE_COLUMNS} FROM nodes WHERE name = ?1 \
                 ORDER BY file_path, start_line"
            ),
            params![name],
        )
    }

    /// Delete all nodes owned by a file. Returns the number deleted.
    pub fn delete_nodes_by_file(&self, path: &str) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        conn.execute("DELETE FROM nodes WHERE file_path = ?1", params![path])
            .map_err(|e| CodescopeError::Storage(e.to_string()))
    }

    pub fn node_count(&self) -> Result<usize, CodescopeError> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    fn query_nodes(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Node>, CodescopeError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?;
        let nodes = stmt
            .query_map(params, node_from_row)
            .map_err(|e| CodescopeError::Storage(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(nodes)
    }
}
