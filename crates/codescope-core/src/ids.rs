//! Deterministic identifiers.
//!
//! Node IDs are a pure function of the identity tuple, so re-indexing an
//! unchanged file reproduces the same IDs and sync reduces to delete-and-
//! reinsert per file. No surrogate counters, no cross-worker negotiation.

use crate::NodeKind;
use sha2::{Digest, Sha256};

/// Field separator for the canonical ID string. A control character so it
/// cannot collide with anything that appears in paths or symbol names.
const SEP: char = '\u{1f}';

/// Deterministic node ID: truncated hex SHA-256 over the identity tuple.
pub fn node_id(kind: NodeKind, file_path: &str, qualified_name: &str, start_line: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.to_string().as_bytes());
    hasher.update(SEP.to_string().as_bytes());
    hasher.update(file_path.as_bytes());
    hasher.update(SEP.to_string().as_bytes());
    hasher.update(qualified_name.as_bytes());
    hasher.update(SEP.to_string().as_bytes());
    hasher.update(start_line.to_string().as_bytes());
    let digest = hasher.finalize();
    // 16 bytes is plenty for uniqueness and keeps IDs readable in queries.
    hex_lower(&digest[..16])
}

/// Hex SHA-256 of raw file bytes; the content hash in file records.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex_lower(&hasher.finalize())
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
    }
    out
}
