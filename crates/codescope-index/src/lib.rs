//! codescope-index: the extraction and resolution pipeline.
//!
//! Source files flow through the parser pool into language-specific pattern
//! queries; the extractor turns the resulting captures into typed nodes,
//! structural edges, and unresolved references; the resolver then binds
//! those references to concrete node IDs in ordered passes. The sync engine
//! drives the whole pipeline incrementally from content-hash change
//! detection, and `Project` is the front door.
//!
//! # Architecture
//!
//! - **parser** — extension table and cached grammar-backed parsers
//! - **queries** — compiled pattern sets yielding captures per match
//! - **languages** — per-language definition/reference patterns
//! - **extractor** — captures to nodes, contains edges, unresolved refs
//! - **frameworks** — pluggable detectors and resolvers for framework idioms
//! - **resolver** — ordered resolution passes with confidence scores
//! - **sync** — hash-driven incremental reindexing
//! - **project** — `.codescope/` lifecycle and facade

pub mod extractor;
pub mod frameworks;
pub mod languages;
pub mod parser;
pub mod project;
pub mod queries;
pub mod resolver;
pub mod sync;

pub use extractor::{extract_file, FileExtraction};
pub use frameworks::{
    FrameworkRegistry, FrameworkResolver, ResolveContext, ResolvedTarget, StoreContext,
};
pub use parser::{Lang, ParserPool};
pub use project::Project;
pub use queries::{Capture, MatchGroup, QueryEngine};
pub use resolver::{ResolutionStats, Resolver};
pub use sync::SyncEngine;
