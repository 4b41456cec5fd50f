//! codescope-core: shared types for the codescope code intelligence engine.
//!
//! Defines the knowledge-graph data model (nodes, edges, file records,
//! unresolved references, vector entries), the unified error taxonomy,
//! deterministic ID construction, project configuration, and the small
//! shared utilities (path validation, cancellation) every other crate
//! builds on.

mod cancel;
mod config;
mod error;
mod ids;
mod paths;
mod types;

pub use cancel::CancelToken;
pub use config::{ProjectConfig, CONFIG_FILE_NAME, PROJECT_DIR_NAME};
pub use error::{CodescopeError, WarningKind};
pub use ids::{content_hash, node_id};
pub use paths::validate_project_path;
pub use types::{
    simple_name_of, Edge, EdgeKind, FileRecord, IndexSummary, IndexWarning, Node, NodeKind, Span,
    UnresolvedReference, VectorEntry,
};
