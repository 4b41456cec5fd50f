//! codescope-graph: traversals and derived queries over the store.
//!
//! The store is the source of truth; every traversal works on node IDs and
//! edge scans rather than an owning in-memory graph. Cycles are queries,
//! not topology violations. All orderings are deterministic: siblings sort
//! by `(file_path, start_line)`.

mod cycles;
mod traversal;

pub use cycles::find_circular_dependencies;
pub use traversal::{GraphQuery, ImpactEntry, NodeContext};
